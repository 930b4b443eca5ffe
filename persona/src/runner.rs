//! Async driver of [`Keyboard`].
//!
//! Waits for key events, host lock state changes and the next timer deadline, whichever
//! comes first, then reports the resulting HID reports and indicator LED changes.

use embassy_futures::select::{Either3, select3};
use embassy_sync::channel::{Receiver, Sender};
use embassy_sync::signal::Signal;
use embassy_time::{Instant, Timer};
use embedded_hal::pwm::SetDutyCycle;
use usbd_hid::descriptor::KeyboardReport;

use crate::RawMutex;
use crate::event::KeyboardEvent;
use crate::hid::HidReporter;
use crate::indicator::IndicatorController;
use crate::keyboard::Keyboard;
use crate::led_indicator::LedIndicator;

/// A task which never finishes
pub trait Runnable {
    async fn run(&mut self) -> !;
}

pub struct KeyboardRunner<
    'a,
    'c,
    P: SetDutyCycle,
    const ROW: usize,
    const COL: usize,
    const NUM_LAYER: usize,
    const EVENT_N: usize,
    const REPORT_N: usize,
> {
    keyboard: Keyboard<'a, ROW, COL, NUM_LAYER>,
    key_events: Receiver<'c, RawMutex, KeyboardEvent, EVENT_N>,
    /// Lock state received from the host
    lock_state: &'c Signal<RawMutex, LedIndicator>,
    reports: Sender<'c, RawMutex, KeyboardReport, REPORT_N>,
    indicators: IndicatorController<P>,
    reporter: HidReporter,
}

impl<
    'a,
    'c,
    P: SetDutyCycle,
    const ROW: usize,
    const COL: usize,
    const NUM_LAYER: usize,
    const EVENT_N: usize,
    const REPORT_N: usize,
> KeyboardRunner<'a, 'c, P, ROW, COL, NUM_LAYER, EVENT_N, REPORT_N>
{
    pub fn new(
        keyboard: Keyboard<'a, ROW, COL, NUM_LAYER>,
        key_events: Receiver<'c, RawMutex, KeyboardEvent, EVENT_N>,
        lock_state: &'c Signal<RawMutex, LedIndicator>,
        reports: Sender<'c, RawMutex, KeyboardReport, REPORT_N>,
        leds: [P; 3],
    ) -> Self {
        let indicators = IndicatorController::new(leds, &keyboard.behavior().indicator);
        Self {
            keyboard,
            key_events,
            lock_state,
            reports,
            indicators,
            reporter: HidReporter::new(),
        }
    }

    pub fn keyboard(&self) -> &Keyboard<'a, ROW, COL, NUM_LAYER> {
        &self.keyboard
    }

    pub fn indicators(&self) -> &IndicatorController<P> {
        &self.indicators
    }

    /// Send a report for every host event that changes it, and update the LEDs
    async fn flush(&mut self) {
        while let Some(event) = self.keyboard.next_host_event() {
            if self.reporter.apply(event) {
                self.reports.send(self.reporter.report()).await;
            }
        }
        if let Some(output) = self.keyboard.take_indicator_update() {
            self.indicators.update(output);
        }
    }
}

impl<
    P: SetDutyCycle,
    const ROW: usize,
    const COL: usize,
    const NUM_LAYER: usize,
    const EVENT_N: usize,
    const REPORT_N: usize,
> Runnable for KeyboardRunner<'_, '_, P, ROW, COL, NUM_LAYER, EVENT_N, REPORT_N>
{
    async fn run(&mut self) -> ! {
        loop {
            self.flush().await;

            let deadline = self.keyboard.next_deadline();
            let timer = async move {
                match deadline {
                    Some(deadline) => Timer::at(deadline).await,
                    None => core::future::pending().await,
                }
            };

            // Lock state first, so that it's carried by the reports of the following key events
            match select3(self.lock_state.wait(), self.key_events.receive(), timer).await {
                Either3::First(leds) => {
                    debug!("Lock state from host: {:?}", leds);
                    self.reporter.set_leds(leds);
                    self.keyboard.set_lock_state(leds);
                }
                Either3::Second(event) => self.keyboard.process_event(event, Instant::now()),
                Either3::Third(_) => self.keyboard.tick(Instant::now()),
            }
        }
    }
}
