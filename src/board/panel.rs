//! Tri-color 2.13" e-paper behind the [`Panel`] trait.
//!
//! Layouts are rendered in `Ink` onto an adapter over the driver's frame
//! buffer, pushed as a full refresh, then the controller is put back to
//! deep sleep until the next update.

use core::convert::Infallible;

use embassy_time::Delay;
use embedded_graphics::prelude::*;
use embedded_hal_bus::spi::{ExclusiveDevice, NoDelay};
use epd_waveshare::color::TriColor;
use epd_waveshare::epd2in13bc::{Display2in13bc, Epd2in13bc};
use epd_waveshare::prelude::*;
use esp_hal::gpio::{Input, Output};
use esp_hal::spi::master::Spi;
use esp_hal::Blocking;
use rememberall::traits::Panel;
use rememberall::ui::display::{render, render_blank};
use rememberall::ui::layout::Layout;
use rememberall::ui::palette::Ink;
use rememberall::Error;

pub type EpdSpi = ExclusiveDevice<Spi<'static, Blocking>, Output<'static>, NoDelay>;

type Driver = Epd2in13bc<EpdSpi, Input<'static>, Output<'static>, Output<'static>, Delay>;

/// Maps `Ink` pixels onto the driver's tri-color buffer.
struct InkCanvas<'a>(&'a mut Display2in13bc);

impl DrawTarget for InkCanvas<'_> {
    type Color = Ink;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        self.0
            .draw_iter(pixels.into_iter().map(|Pixel(p, ink)| Pixel(p, tri_color(ink))))
    }
}

impl OriginDimensions for InkCanvas<'_> {
    fn size(&self) -> Size {
        self.0.size()
    }
}

fn tri_color(ink: Ink) -> TriColor {
    match ink {
        Ink::White => TriColor::White,
        Ink::Black => TriColor::Black,
        Ink::Red => TriColor::Chromatic,
    }
}

pub struct EpaperPanel {
    spi: EpdSpi,
    epd: Driver,
    frame: Display2in13bc,
    delay: Delay,
}

impl EpaperPanel {
    pub fn new(
        mut spi: EpdSpi,
        busy: Input<'static>,
        dc: Output<'static>,
        rst: Output<'static>,
    ) -> Result<Self, Error> {
        let mut delay = Delay;
        let mut epd =
            Epd2in13bc::new(&mut spi, busy, dc, rst, &mut delay, None).map_err(|_| Error::Display)?;
        epd.sleep(&mut spi, &mut delay).map_err(|_| Error::Display)?;

        let mut frame = Display2in13bc::default();
        frame.set_rotation(DisplayRotation::Rotate90);

        Ok(Self {
            spi,
            epd,
            frame,
            delay,
        })
    }

    fn push(&mut self) -> Result<(), Error> {
        let spi = &mut self.spi;
        let delay = &mut self.delay;
        self.epd.wake_up(spi, delay).map_err(|_| Error::Display)?;
        self.epd
            .update_color_frame(
                spi,
                delay,
                self.frame.bw_buffer(),
                self.frame.chromatic_buffer(),
            )
            .map_err(|_| Error::Display)?;
        self.epd.display_frame(spi, delay).map_err(|_| Error::Display)?;
        self.epd.sleep(spi, delay).map_err(|_| Error::Display)
    }
}

impl Panel for EpaperPanel {
    fn draw(&mut self, layout: &Layout) -> Result<(), Error> {
        render(&mut InkCanvas(&mut self.frame), layout).map_err(|never| match never {})?;
        self.push()
    }

    fn blank(&mut self) -> Result<(), Error> {
        render_blank(&mut InkCanvas(&mut self.frame)).map_err(|never| match never {})?;
        self.push()
    }
}
