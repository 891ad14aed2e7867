//! One-shot hardware peripheral initialization.
//!
//! Configures GPIO directions, the contact interrupt and the battery ADC
//! using raw ESP-IDF sys calls. Called once from `main()` before the duty
//! cycle starts.  Host builds get simulation stubs with the same signatures.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

use crate::error;
#[cfg(target_os = "espidf")]
use crate::error::HwInitError;
#[cfg(target_os = "espidf")]
use crate::pins;

#[cfg(target_os = "espidf")]
pub fn init_peripherals() -> error::Result<()> {
    // SAFETY: Called once from main() before the duty cycle; single-threaded.
    unsafe {
        init_gpio_outputs()?;
        init_gpio_inputs()?;
    }
    info!("hw_init: all peripherals configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals() -> error::Result<()> {
    log::info!("hw_init(sim): peripheral init skipped");
    Ok(())
}

// ── ADC (oneshot, opened per measurement) ─────────────────────
//
// The unit is created when a supply measurement starts and deleted when it
// ends, so the ADC draws nothing while the node sleeps.

#[cfg(target_os = "espidf")]
static mut ADC1_HANDLE: adc_oneshot_unit_handle_t = core::ptr::null_mut();

/// SAFETY: Must be called only from the main-loop ADC path.  The ISR never
/// touches the ADC, so there is no concurrent access.
#[cfg(target_os = "espidf")]
unsafe fn adc1_handle() -> adc_oneshot_unit_handle_t {
    unsafe { ADC1_HANDLE }
}

/// Power up ADC1 and configure the battery channel.
#[cfg(target_os = "espidf")]
pub fn adc1_open() -> error::Result<()> {
    // SAFETY: main-loop only; see adc1_handle().
    unsafe {
        if !adc1_handle().is_null() {
            return Ok(());
        }
        let init_cfg = adc_oneshot_unit_init_cfg_t {
            unit_id: adc_unit_t_ADC_UNIT_1,
            ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
            ..Default::default()
        };
        let ret = adc_oneshot_new_unit(&init_cfg, &raw mut ADC1_HANDLE);
        if ret != ESP_OK as i32 {
            return Err(HwInitError::AdcInitFailed(ret).into());
        }

        let chan_cfg = adc_oneshot_chan_cfg_t {
            atten: adc_atten_t_ADC_ATTEN_DB_12,
            bitwidth: adc_bitwidth_t_ADC_BITWIDTH_12,
        };
        let ret = adc_oneshot_config_channel(adc1_handle(), pins::BATTERY_ADC_CHANNEL, &chan_cfg);
        if ret != ESP_OK as i32 {
            adc1_close();
            return Err(HwInitError::AdcInitFailed(ret).into());
        }
    }
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn adc1_open() -> error::Result<()> {
    Ok(())
}

/// Release ADC1.  No-op when it is not open.
#[cfg(target_os = "espidf")]
pub fn adc1_close() {
    // SAFETY: main-loop only; the handle is cleared before anyone can
    // observe the deleted unit.
    unsafe {
        let handle = adc1_handle();
        if !handle.is_null() {
            adc_oneshot_del_unit(handle);
            ADC1_HANDLE = core::ptr::null_mut();
        }
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn adc1_close() {}

/// One 12-bit conversion; 0 when the unit is closed or the read fails.
#[cfg(target_os = "espidf")]
pub fn adc1_read(channel: u32) -> u16 {
    let mut raw: i32 = 0;
    // SAFETY: adc1_handle() contract, single-threaded main-loop access only.
    let ret = unsafe {
        let handle = adc1_handle();
        if handle.is_null() {
            return 0;
        }
        adc_oneshot_read(handle, channel, &mut raw)
    };
    if ret != ESP_OK as i32 {
        return 0;
    }
    raw.max(0) as u16
}

/// Simulated battery: 2048 of 4095, about 3.3 V through a 1:1 divider.
#[cfg(not(target_os = "espidf"))]
pub fn adc1_read(_channel: u32) -> u16 {
    2048
}

// ── GPIO Outputs ──────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_gpio_outputs() -> Result<(), HwInitError> {
    // Rail switch: push-pull.  Sensor data lines: open-drain, so the
    // single-wire bus can be released and read back without reconfiguring.
    let outputs = [
        (pins::SENSOR_POWER_GPIO, gpio_mode_t_GPIO_MODE_OUTPUT),
        (pins::SENSOR_DATA_GPIO, gpio_mode_t_GPIO_MODE_INPUT_OUTPUT_OD),
        (pins::SENSOR2_DATA_GPIO, gpio_mode_t_GPIO_MODE_INPUT_OUTPUT_OD),
    ];

    for &(pin, mode) in &outputs {
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pin,
            mode,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        };
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK as i32 {
            return Err(HwInitError::GpioConfigFailed(ret));
        }
        // Rail off, data lines parked low.
        unsafe { gpio_set_level(pin, 0) };
    }

    info!("hw_init: GPIO outputs configured");
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_write(pin: i32, high: bool) {
    // SAFETY: gpio_set_level writes to an already-configured output pin;
    // pin was validated during init_gpio_outputs(). Main-loop only.
    unsafe {
        gpio_set_level(pin, u32::from(high));
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_write(_pin: i32, _high: bool) {}

// ── GPIO Inputs ───────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_gpio_inputs() -> Result<(), HwInitError> {
    let cfg = gpio_config_t {
        pin_bit_mask: 1u64 << pins::CONTACT_GPIO,
        mode: gpio_mode_t_GPIO_MODE_INPUT,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_ENABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_ANYEDGE,
    };
    let ret = unsafe { gpio_config(&cfg) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::GpioConfigFailed(ret));
    }

    info!("hw_init: GPIO inputs configured");
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_read(pin: i32) -> bool {
    // SAFETY: gpio_get_level is a read-only register access on an
    // already-configured input pin; safe to call from main context.
    (unsafe { gpio_get_level(pin) }) != 0
}

/// Simulated inputs idle high (pull-ups, contact open).
#[cfg(not(target_os = "espidf"))]
pub fn gpio_read(_pin: i32) -> bool {
    true
}

// ── GPIO ISR Service ──────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe extern "C" fn contact_gpio_isr(_arg: *mut core::ffi::c_void) {
    crate::events::contact_isr_handler();
}

/// Install the per-pin GPIO ISR service and register the contact handler.
/// Call after init_peripherals() and before the duty cycle.
#[cfg(target_os = "espidf")]
pub fn init_isr_service() -> error::Result<()> {
    // SAFETY: gpio_install_isr_service is idempotent; ESP_ERR_INVALID_STATE
    // means it was already installed (acceptable). The handler registered
    // below only raises an atomic flag.
    unsafe {
        let ret = gpio_install_isr_service(0);
        if ret != ESP_OK as i32 && ret != ESP_ERR_INVALID_STATE as i32 {
            return Err(HwInitError::IsrInstallFailed(ret).into());
        }

        // Contact switch: any edge (door opened or closed)
        gpio_set_intr_type(pins::CONTACT_GPIO, gpio_int_type_t_GPIO_INTR_ANYEDGE);
        let ret = gpio_isr_handler_add(pins::CONTACT_GPIO, Some(contact_gpio_isr), core::ptr::null_mut());
        if ret != ESP_OK as i32 {
            return Err(HwInitError::IsrInstallFailed(ret).into());
        }
        gpio_intr_enable(pins::CONTACT_GPIO);

        info!("hw_init: ISR service installed (contact)");
    }
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_isr_service() -> error::Result<()> {
    log::info!("hw_init(sim): ISR service skipped");
    Ok(())
}
