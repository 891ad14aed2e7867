//! Light-sleep adapter.
//!
//! Implements [`SleepPort`] with ESP-IDF automatic light sleep: RAM and the
//! CPU state survive, so the duty cycle simply resumes after each chunk.
//!
//! ## Contact wake
//!
//! Light-sleep GPIO wake is level-triggered, not edge-triggered, and the
//! edge ISR does not run for a level that woke the chip.  Before each chunk
//! the adapter arms the wake on the *opposite* of the current contact level;
//! when a GPIO wake ends the chunk it raises the pending-event flag itself
//! and restores the any-edge interrupt.
//!
//! - **`target_os = "espidf"`**: `esp_light_sleep_start()`.
//! - **all other targets**: `std::thread::sleep`.

use crate::app::ports::SleepPort;
use crate::events::PendingEvent;

pub struct LightSleep {
    /// Flag to raise when a contact change ends a chunk; `None` disables
    /// GPIO wake entirely (profiles without a contact input).
    #[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
    contact_event: Option<&'static PendingEvent>,
}

impl LightSleep {
    pub fn new(contact_event: Option<&'static PendingEvent>) -> Self {
        Self { contact_event }
    }
}

#[cfg(target_os = "espidf")]
impl SleepPort for LightSleep {
    fn sleep_chunk(&mut self, ms: u32) {
        use esp_idf_svc::sys::*;

        use crate::pins;

        // SAFETY: main task only; the wake sources are re-armed for every
        // chunk and the contact pin interrupt is restored before returning.
        unsafe {
            esp_sleep_enable_timer_wakeup(u64::from(ms) * 1_000);

            if self.contact_event.is_some() {
                let wake_level = if gpio_get_level(pins::CONTACT_GPIO) != 0 {
                    gpio_int_type_t_GPIO_INTR_LOW_LEVEL
                } else {
                    gpio_int_type_t_GPIO_INTR_HIGH_LEVEL
                };
                gpio_wakeup_enable(pins::CONTACT_GPIO, wake_level);
                esp_sleep_enable_gpio_wakeup();
            }

            esp_light_sleep_start();

            if let Some(event) = self.contact_event {
                if esp_sleep_get_wakeup_cause() == esp_sleep_source_t_ESP_SLEEP_WAKEUP_GPIO {
                    event.raise();
                }
                gpio_wakeup_disable(pins::CONTACT_GPIO);
                gpio_set_intr_type(pins::CONTACT_GPIO, gpio_int_type_t_GPIO_INTR_ANYEDGE);
            }
        }
    }
}

#[cfg(not(target_os = "espidf"))]
impl SleepPort for LightSleep {
    fn sleep_chunk(&mut self, ms: u32) {
        std::thread::sleep(std::time::Duration::from_millis(u64::from(ms)));
    }
}
