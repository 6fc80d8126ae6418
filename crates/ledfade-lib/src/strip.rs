//! LED strip abstraction: trait and backends.
//!
//! [`LedStrip`] is the seam between the fade engine and the physical strip:
//! one broadcast color in, one committed frame out. Backends:
//!
//! - [`ws281x::Ws281xStrip`] (feature `ws281x`): DMA-driven WS2812 strip on
//!   a Raspberry Pi, via the rpi_ws281x bindings.
//! - [`SmartLedsStrip`] adapter for any `smart-leds` driver.
//! - [`mock::CaptureStrip`] in-memory strip for tests.

use std::fmt;

use serde::Deserialize;
use smart_leds_trait::{RGB8, SmartLedsWrite};

use crate::color::Color;

// ── Error type ──

/// Strip hardware errors.
#[derive(Debug)]
pub enum StripError {
    InitFailed(String),
    RenderFailed(String),
    Unsupported(String),
}

impl fmt::Display for StripError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StripError::InitFailed(e) => write!(f, "Strip init failed: {e}"),
            StripError::RenderFailed(e) => write!(f, "Strip render failed: {e}"),
            StripError::Unsupported(e) => write!(f, "No strip driver: {e}"),
        }
    }
}

impl std::error::Error for StripError {}

pub type Result<T> = std::result::Result<T, StripError>;

// ── Configuration ──

/// Physical strip wiring and driver settings.
///
/// Deployment constants, not per-run parameters: every invocation on a host
/// drives the same strip the same way.
#[derive(Debug, Clone, Deserialize)]
pub struct StripConfig {
    /// BCM GPIO pin carrying the data line.
    #[serde(default = "default_pin")]
    pub pin: u8,

    /// DMA channel used by the driver.
    #[serde(default = "default_dma_channel")]
    pub dma_channel: u8,

    /// Number of LEDs on the strip.
    #[serde(default = "default_led_count")]
    pub led_count: usize,

    /// Brightness ceiling applied by the driver (0-255).
    #[serde(default = "default_brightness")]
    pub brightness: u8,

    /// Signal frequency in Hz.
    #[serde(default = "default_frequency_hz")]
    pub frequency_hz: u32,
}

fn default_pin() -> u8 {
    18
}
fn default_dma_channel() -> u8 {
    10
}
fn default_led_count() -> usize {
    5
}
fn default_brightness() -> u8 {
    255
}
fn default_frequency_hz() -> u32 {
    800_000
}

impl Default for StripConfig {
    fn default() -> Self {
        StripConfig {
            pin: default_pin(),
            dma_channel: default_dma_channel(),
            led_count: default_led_count(),
            brightness: default_brightness(),
            frequency_hz: default_frequency_hz(),
        }
    }
}

// ── Trait ──

/// An initialized LED strip. Construction is initialization; a backend that
/// cannot open the hardware fails its constructor, not `display`.
pub trait LedStrip {
    /// Set every LED to `color`, then commit the frame to hardware.
    fn display(&mut self, color: Color) -> Result<()>;

    /// Tear down the strip. LEDs keep their last displayed color.
    fn shutdown(&mut self);
}

impl<T: LedStrip + ?Sized> LedStrip for Box<T> {
    fn display(&mut self, color: Color) -> Result<()> {
        (**self).display(color)
    }

    fn shutdown(&mut self) {
        (**self).shutdown()
    }
}

// ── smart-leds adapter ──

/// Adapter driving any [`SmartLedsWrite`] implementation as a [`LedStrip`].
///
/// Fans the broadcast color out `led_count` times into the driver's frame
/// write, which commits in one call.
pub struct SmartLedsStrip<W> {
    driver: W,
    led_count: usize,
}

impl<W> SmartLedsStrip<W> {
    pub fn new(driver: W, led_count: usize) -> Self {
        SmartLedsStrip { driver, led_count }
    }
}

impl<W> LedStrip for SmartLedsStrip<W>
where
    W: SmartLedsWrite,
    W::Error: fmt::Debug,
    RGB8: Into<W::Color>,
{
    fn display(&mut self, color: Color) -> Result<()> {
        let px = RGB8::from(color);
        self.driver
            .write((0..self.led_count).map(|_| px))
            .map_err(|e| StripError::RenderFailed(format!("{e:?}")))
    }

    fn shutdown(&mut self) {}
}

// ── rpi_ws281x backend ──

#[cfg(feature = "ws281x")]
pub mod ws281x {
    //! DMA-driven WS2812 backend for Raspberry Pi hosts.

    use rs_ws281x::{ChannelBuilder, Controller, ControllerBuilder, StripType};

    use super::{LedStrip, Result, StripConfig, StripError};
    use crate::color::Color;

    /// WS2812 strip on channel 0 of the PWM/DMA controller.
    pub struct Ws281xStrip {
        controller: Controller,
    }

    impl Ws281xStrip {
        /// Initialize the DMA controller for the configured strip.
        pub fn open(config: &StripConfig) -> Result<Self> {
            let controller = ControllerBuilder::new()
                .freq(config.frequency_hz)
                .dma(i32::from(config.dma_channel))
                .channel(
                    0,
                    ChannelBuilder::new()
                        .pin(i32::from(config.pin))
                        .count(config.led_count as i32)
                        .invert(false)
                        .strip_type(StripType::Ws2811Grb)
                        .brightness(config.brightness)
                        .build(),
                )
                .build()
                .map_err(|e| StripError::InitFailed(format!("{e:?}")))?;
            log::debug!(
                "ws281x controller up: pin {}, dma {}, {} leds",
                config.pin,
                config.dma_channel,
                config.led_count
            );
            Ok(Ws281xStrip { controller })
        }
    }

    impl LedStrip for Ws281xStrip {
        fn display(&mut self, color: Color) -> Result<()> {
            // Driver buffer byte order is [B, G, R, W].
            for led in self.controller.leds_mut(0) {
                *led = [color.b, color.g, color.r, 0];
            }
            self.controller
                .render()
                .map_err(|e| StripError::RenderFailed(format!("{e:?}")))
        }

        fn shutdown(&mut self) {
            // ws2811_fini runs when the controller drops.
        }
    }
}

// ── Mock strip ──

/// In-memory strip for unit and integration tests.
///
/// Always compiled (zero runtime cost), hidden from public docs.
#[doc(hidden)]
pub mod mock {
    use super::{LedStrip, Result, StripError};
    use crate::color::Color;

    /// Records every displayed frame. `fail_at` injects a render failure at
    /// the Nth `display` call (0-based), before the frame is recorded.
    #[derive(Debug, Default)]
    pub struct CaptureStrip {
        pub frames: Vec<Color>,
        pub fail_at: Option<usize>,
        pub shutdown_calls: u32,
    }

    impl CaptureStrip {
        pub fn new() -> Self {
            CaptureStrip::default()
        }
    }

    impl LedStrip for CaptureStrip {
        fn display(&mut self, color: Color) -> Result<()> {
            if self.fail_at == Some(self.frames.len()) {
                return Err(StripError::RenderFailed(
                    "mock: display failure injected".into(),
                ));
            }
            self.frames.push(color);
            Ok(())
        }

        fn shutdown(&mut self) {
            self.shutdown_calls += 1;
        }
    }
}
