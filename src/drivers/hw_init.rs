//! One-shot hardware peripheral initialization.
//!
//! Configures the servo LEDC timer/channel and the touch-sense GPIO using
//! raw ESP-IDF sys calls, and binds the touch ISR to the device context.
//! Called once from `main()` before the poll loop starts.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

use embedded_hal::pwm::{ErrorKind, ErrorType, SetDutyCycle};

use crate::app::context::DeviceContext;
use crate::app::ports::ActuatorPort;
#[cfg(target_os = "espidf")]
use crate::pins;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    LedcInitFailed(i32),
    GpioConfigFailed(i32),
    IsrInstallFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::LedcInitFailed(rc) => write!(f, "LEDC timer/channel config failed (rc={})", rc),
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
            Self::IsrInstallFailed(rc) => write!(f, "GPIO ISR install failed (rc={})", rc),
        }
    }
}

// ── LEDC PWM ─────────────────────────────────────────────────

pub const LEDC_CH_SERVO: u32 = 0;

/// Claim the servo output: 50 Hz LEDC timer plus one channel on the
/// servo GPIO, duty 0 until the probe driver writes its first angle.
#[cfg(target_os = "espidf")]
pub fn init_servo_pwm() -> Result<(), HwInitError> {
    let timer = ledc_timer_config_t {
        speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
        timer_num: ledc_timer_t_LEDC_TIMER_0,
        duty_resolution: ledc_timer_bit_t_LEDC_TIMER_14_BIT,
        freq_hz: pins::SERVO_PWM_FREQ_HZ,
        clk_cfg: soc_periph_ledc_clk_src_legacy_t_LEDC_AUTO_CLK,
        ..Default::default()
    };
    // SAFETY: Called once from the single-threaded bootstrap path.
    let ret = unsafe { ledc_timer_config(&timer) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::LedcInitFailed(ret));
    }

    let channel = ledc_channel_config_t {
        speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
        channel: LEDC_CH_SERVO,
        timer_sel: ledc_timer_t_LEDC_TIMER_0,
        gpio_num: pins::SERVO_PWM_GPIO,
        duty: 0,
        hpoint: 0,
        ..Default::default()
    };
    // SAFETY: Timer 0 configured above; channel 0 is not used elsewhere.
    let ret = unsafe { ledc_channel_config(&channel) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::LedcInitFailed(ret));
    }

    info!(
        "hw_init: LEDC configured (servo=CH{} on GPIO{}, {} Hz)",
        LEDC_CH_SERVO,
        pins::SERVO_PWM_GPIO,
        pins::SERVO_PWM_FREQ_HZ
    );
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_servo_pwm() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): LEDC init skipped");
    Ok(())
}

/// Handle to the servo channel.  Writes fail until [`init_servo_pwm`]
/// has succeeded.
pub const fn servo_channel() -> LedcChannel {
    LedcChannel::new(LEDC_CH_SERVO)
}

/// LEDC duty update failure (raw `esp_err_t`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedcError(pub i32);

impl embedded_hal::pwm::Error for LedcError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// Handle to one configured LEDC channel.  Holds only the channel number,
/// so copies are free and writes are safe from the touch ISR.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedcChannel {
    channel: u32,
}

impl LedcChannel {
    const fn new(channel: u32) -> Self {
        Self { channel }
    }

    pub fn channel(&self) -> u32 {
        self.channel
    }
}

impl ErrorType for LedcChannel {
    type Error = LedcError;
}

impl SetDutyCycle for LedcChannel {
    fn max_duty_cycle(&self) -> u16 {
        ((1u32 << crate::pins::SERVO_PWM_RESOLUTION_BITS) - 1) as u16
    }

    #[cfg(target_os = "espidf")]
    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), LedcError> {
        // SAFETY: The channel was configured in init_servo_pwm().  Duty
        // register writes are spinlock-protected inside the LEDC driver,
        // so the ISR and the main loop may both call this.
        let ret = unsafe {
            ledc_set_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, self.channel, duty as u32)
        };
        if ret != ESP_OK as i32 {
            return Err(LedcError(ret));
        }
        let ret = unsafe { ledc_update_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, self.channel) };
        if ret != ESP_OK as i32 {
            return Err(LedcError(ret));
        }
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn set_duty_cycle(&mut self, _duty: u16) -> Result<(), LedcError> {
        Ok(())
    }
}

// ── Touch input + ISR ─────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe extern "C" fn touch_gpio_isr<A: ActuatorPort>(arg: *mut core::ffi::c_void) {
    // SAFETY: `arg` is the `&'static DeviceContext<A>` registered in
    // bind_touch_interrupt(); it is never freed.
    let ctx = unsafe { &*(arg as *const DeviceContext<A>) };
    ctx.on_touch();
}

/// Configure the touch line as a pulled-up input, install the GPIO ISR
/// service and route rising edges to `ctx.on_touch()`.
#[cfg(target_os = "espidf")]
pub fn bind_touch_interrupt<A: ActuatorPort>(
    ctx: &'static DeviceContext<A>,
) -> Result<(), HwInitError> {
    let cfg = gpio_config_t {
        pin_bit_mask: 1u64 << pins::TOUCH_IRQ_GPIO,
        mode: gpio_mode_t_GPIO_MODE_INPUT,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_ENABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_POSEDGE,
        ..Default::default()
    };
    // SAFETY: Single-threaded bootstrap; the pin is owned by this module.
    unsafe {
        let ret = gpio_config(&cfg);
        if ret != ESP_OK as i32 {
            return Err(HwInitError::GpioConfigFailed(ret));
        }

        // ESP_ERR_INVALID_STATE means the service is already installed.
        let ret = gpio_install_isr_service(0);
        if ret != ESP_OK as i32 && ret != ESP_ERR_INVALID_STATE as i32 {
            return Err(HwInitError::IsrInstallFailed(ret));
        }

        let arg = ctx as *const DeviceContext<A> as *mut core::ffi::c_void;
        let ret = gpio_isr_handler_add(pins::TOUCH_IRQ_GPIO, Some(touch_gpio_isr::<A>), arg);
        if ret != ESP_OK as i32 {
            return Err(HwInitError::IsrInstallFailed(ret));
        }
        gpio_intr_enable(pins::TOUCH_IRQ_GPIO);
    }

    info!("hw_init: touch ISR bound (GPIO{}, rising edge)", pins::TOUCH_IRQ_GPIO);
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn bind_touch_interrupt<A: ActuatorPort>(
    _ctx: &'static DeviceContext<A>,
) -> Result<(), HwInitError> {
    log::info!("hw_init(sim): touch ISR skipped");
    Ok(())
}
