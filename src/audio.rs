use std::f32::consts::PI;

use color_eyre::eyre::{bail, eyre, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, SizedSample};
use log::{debug, error};

const TONE_HZ: f32 = 440.0;
const AMPLITUDE: f32 = 0.2;

/// A 440 Hz tone that follows the sound timer.
pub struct Beeper {
    stream: cpal::Stream,
    sounding: bool,
}

impl Beeper {
    pub fn new() -> Result<Self> {
        let stream = setup()?;
        stream.pause()?;
        Ok(Self {
            stream,
            sounding: false,
        })
    }

    /// Start or stop the tone. Only level changes reach the device.
    pub fn set(&mut self, on: bool) -> Result<()> {
        if on == self.sounding {
            return Ok(());
        }
        if on {
            self.stream.play()?;
        } else {
            self.stream.pause()?;
        }
        self.sounding = on;
        debug!("beeper {}", if on { "on" } else { "off" });
        Ok(())
    }
}

fn setup() -> Result<cpal::Stream> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| eyre!("No output device"))?;
    let supported = device.default_output_config()?;

    // Capture sample format before converting to StreamConfig
    let sample_format = supported.sample_format();
    let config: cpal::StreamConfig = supported.into();

    match sample_format {
        cpal::SampleFormat::F32 => build_stream::<f32>(&device, &config),
        cpal::SampleFormat::I16 => build_stream::<i16>(&device, &config),
        cpal::SampleFormat::U16 => build_stream::<u16>(&device, &config),
        other => bail!("Unsupported sample format: {other:?}"),
    }
}

fn build_stream<T>(device: &cpal::Device, config: &cpal::StreamConfig) -> Result<cpal::Stream>
where
    T: SizedSample + FromSample<f32>,
{
    let channels = config.channels as usize;
    let phase_inc = 2.0 * PI * TONE_HZ / config.sample_rate.0 as f32;
    let mut phase = 0.0_f32;

    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _| write_sine(data, channels, &mut phase, phase_inc),
        |e| error!("stream error: {e}"),
        None,
    )?;
    Ok(stream)
}

fn write_sine<T: FromSample<f32>>(buf: &mut [T], ch: usize, phase: &mut f32, inc: f32) {
    for frame in buf.chunks_mut(ch) {
        let s = (*phase).sin() * AMPLITUDE;
        *phase = (*phase + inc) % (2.0 * PI);
        for sample in frame {
            *sample = T::from_sample_(s);
        }
    }
}
