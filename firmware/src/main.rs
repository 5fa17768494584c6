#![no_std]
#![no_main]

// Logging support
#[cfg(feature = "defmt")]
use defmt::{debug, error, info, warn};
#[cfg(feature = "defmt")]
use defmt_rtt as _;
use panic_halt as _;

// Logging macros that only borrow their arguments when defmt is not available
#[cfg(not(feature = "defmt"))]
macro_rules! info {
    ($fmt:literal $(, $arg:expr)* $(,)?) => {{
        $( let _ = &$arg; )*
    }};
}

#[cfg(not(feature = "defmt"))]
macro_rules! debug {
    ($fmt:literal $(, $arg:expr)* $(,)?) => {{
        $( let _ = &$arg; )*
    }};
}

#[cfg(not(feature = "defmt"))]
macro_rules! warn {
    ($fmt:literal $(, $arg:expr)* $(,)?) => {{
        $( let _ = &$arg; )*
    }};
}

#[cfg(not(feature = "defmt"))]
macro_rules! error {
    ($fmt:literal $(, $arg:expr)* $(,)?) => {{
        $( let _ = &$arg; )*
    }};
}

use core::cell::RefCell;
use critical_section::Mutex;
use morse_core::{
    Actuator, HalError, LetterOutcome, MemorySettings, MorseContext, SerialFramer, TimingConfig,
};
use riscv_rt::entry;

// Critical section implementation for RISC-V
struct RiscvCriticalSection;
critical_section::set_impl!(RiscvCriticalSection);

unsafe impl critical_section::Impl for RiscvCriticalSection {
    unsafe fn acquire() -> critical_section::RawRestoreState {
        let mstatus = riscv::register::mstatus::read();
        riscv::register::mstatus::clear_mie();
        mstatus.mie() as u8
    }

    unsafe fn release(was_enabled: critical_section::RawRestoreState) {
        if was_enabled != 0 {
            riscv::register::mstatus::set_mie();
        }
    }
}

// ========================================
// CH32V203 Hardware Definitions
// ========================================

/// Peripheral base addresses
const RCC_BASE: u32 = 0x4002_1000;
const GPIOA_BASE: u32 = 0x4001_0800;
const TIM1_BASE: u32 = 0x4001_2C00;
const TIM2_BASE: u32 = 0x4000_0000;
const USART1_BASE: u32 = 0x4001_3800;
const PFIC_BASE: u32 = 0xE000_E000;

/// RCC Register offsets
const RCC_APB2PCENR: u32 = 0x18;
const RCC_APB1PCENR: u32 = 0x1C;

/// GPIO Register offsets
const GPIO_CRL: u32 = 0x00;
const GPIO_CRH: u32 = 0x04;
const GPIO_BSHR: u32 = 0x10;

/// Timer Register offsets
const TIM_CTLR1: u32 = 0x00;
const TIM_DMAINTENR: u32 = 0x0C;
const TIM_INTFR: u32 = 0x10;
const TIM_CHCTLR1: u32 = 0x18;
const TIM_CCER: u32 = 0x20;
const TIM_PSC: u32 = 0x28;
const TIM_ATRLR: u32 = 0x2C;
const TIM_CH1CVR: u32 = 0x34;
const TIM_BDTR: u32 = 0x44;

/// USART Register offsets
const USART_STATR: u32 = 0x00;
const USART_DATAR: u32 = 0x04;
const USART_BRR: u32 = 0x08;
const USART_CTLR1: u32 = 0x0C;

/// PFIC interrupt enable register for IRQs 32..63
const PFIC_IENR2: u32 = 0x104;
const TIM2_IRQ_BIT: u32 = 44 - 32;
const USART1_IRQ_BIT: u32 = 53 - 32;

/// HSI after reset, no PLL
const SYSCLK_HZ: u32 = 8_000_000;
const UART_BAUD: u32 = 115_200;

/// 1 MHz timer clock, 600 Hz buzzer tone
const TONE_PRESCALER: u32 = SYSCLK_HZ / 1_000_000 - 1;
const TONE_RELOAD: u16 = 1_666;

/// 10 kHz timer clock for the playback period
const PERIOD_PRESCALER: u32 = SYSCLK_HZ / 10_000 - 1;
const PERIOD_TICKS_PER_MS: u32 = 10;

/// Status LED on PA5, buzzer on PA8 (TIM1_CH1), USART1 on PA9/PA10
const LED_PIN: u32 = 5;

#[inline(always)]
fn reg_read(addr: u32) -> u32 {
    unsafe { core::ptr::read_volatile(addr as *const u32) }
}

#[inline(always)]
fn reg_write(addr: u32, value: u32) {
    unsafe { core::ptr::write_volatile(addr as *mut u32, value) }
}

#[inline(always)]
fn reg_modify(addr: u32, f: impl FnOnce(u32) -> u32) {
    reg_write(addr, f(reg_read(addr)));
}

// ========================================
// Actuator
// ========================================

/// Buzzer on TIM1 channel 1 and status LED on a GPIO
struct Ch32Actuator {
    duty: u16,
    sounding: bool,
}

impl Ch32Actuator {
    const fn new() -> Self {
        Self {
            duty: TONE_RELOAD / 2,
            sounding: false,
        }
    }

    fn write_compare(&self, value: u16) {
        reg_write(TIM1_BASE + TIM_CH1CVR, value as u32);
    }
}

impl Actuator for Ch32Actuator {
    type Error = HalError;

    fn set_tone(&mut self, active: bool) -> Result<(), Self::Error> {
        self.write_compare(if active { self.duty } else { 0 });
        self.sounding = active;
        Ok(())
    }

    fn set_indicator(&mut self, active: bool) -> Result<(), Self::Error> {
        // Low half of BSHR sets, high half resets
        let bit = if active { 1 << LED_PIN } else { 1 << (LED_PIN + 16) };
        reg_write(GPIOA_BASE + GPIO_BSHR, bit);
        Ok(())
    }

    fn set_tone_duty(&mut self, duty: u16) -> Result<(), Self::Error> {
        self.duty = duty.min(TONE_RELOAD);
        if self.sounding {
            self.write_compare(self.duty);
        }
        Ok(())
    }

    fn max_tone_duty(&self) -> u16 {
        TONE_RELOAD
    }
}

// ========================================
// Global State
// ========================================

static CONTEXT: MorseContext<Ch32Actuator, 256, 1024> =
    MorseContext::new(Ch32Actuator::new(), TimingConfig::standard());

/// Volume survives only until reset; there is no flash-backed store
static SETTINGS: Mutex<RefCell<MemorySettings<4>>> =
    Mutex::new(RefCell::new(MemorySettings::new()));

static FRAMER: Mutex<RefCell<SerialFramer>> = Mutex::new(RefCell::new(SerialFramer::new()));

// ========================================
// Hardware Initialization
// ========================================

fn hardware_init() {
    enable_peripheral_clocks();
    configure_gpio_pins();
    configure_tone_pwm();
    configure_uart();
    configure_period_timer();
    enable_interrupts();

    info!("✅ Hardware initialization complete");
}

fn enable_peripheral_clocks() {
    // APB2: AFIO (0), GPIOA (2), TIM1 (11), USART1 (14)
    reg_modify(RCC_BASE + RCC_APB2PCENR, |v| v | (1 << 0) | (1 << 2) | (1 << 11) | (1 << 14));
    // APB1: TIM2 (0)
    reg_modify(RCC_BASE + RCC_APB1PCENR, |v| v | 1);
}

fn configure_gpio_pins() {
    // PA5: push-pull output 50MHz
    reg_modify(GPIOA_BASE + GPIO_CRL, |mut crl| {
        crl &= !(0xF << (LED_PIN * 4));
        crl | (0x3 << (LED_PIN * 4))
    });

    // PA8: AF push-pull (TIM1_CH1), PA9: AF push-pull (TX), PA10: floating input (RX)
    reg_modify(GPIOA_BASE + GPIO_CRH, |mut crh| {
        crh &= !0xFFF;
        crh | 0xB | (0xB << 4) | (0x4 << 8)
    });

    reg_write(GPIOA_BASE + GPIO_BSHR, 1 << (LED_PIN + 16));
}

fn configure_tone_pwm() {
    reg_write(TIM1_BASE + TIM_PSC, TONE_PRESCALER);
    reg_write(TIM1_BASE + TIM_ATRLR, TONE_RELOAD as u32);
    reg_write(TIM1_BASE + TIM_CH1CVR, 0);

    // PWM mode 1 on channel 1 with preload
    reg_write(TIM1_BASE + TIM_CHCTLR1, (0x6 << 4) | (1 << 3));
    reg_write(TIM1_BASE + TIM_CCER, 1);

    // Advanced timer needs the main output enable
    reg_write(TIM1_BASE + TIM_BDTR, 1 << 15);

    // ARPE, CEN
    reg_write(TIM1_BASE + TIM_CTLR1, (1 << 7) | 1);
}

fn configure_uart() {
    reg_write(USART1_BASE + USART_BRR, SYSCLK_HZ / UART_BAUD);
    // UE (13), RXNEIE (5), TE (3), RE (2)
    reg_write(USART1_BASE + USART_CTLR1, (1 << 13) | (1 << 5) | (1 << 3) | (1 << 2));
}

fn configure_period_timer() {
    let period_ms = CONTEXT.timing().period.as_millis() as u32;
    let reload = (period_ms * PERIOD_TICKS_PER_MS).clamp(1, 0x1_0000) - 1;

    reg_write(TIM2_BASE + TIM_PSC, PERIOD_PRESCALER);
    reg_write(TIM2_BASE + TIM_ATRLR, reload);
    // UIE
    reg_write(TIM2_BASE + TIM_DMAINTENR, 1);
    reg_write(TIM2_BASE + TIM_CTLR1, (1 << 7) | 1);

    info!("⏱️ Playback period {}ms, reload {}", period_ms, reload);
}

fn enable_interrupts() {
    reg_modify(PFIC_BASE + PFIC_IENR2, |v| v | (1 << TIM2_IRQ_BIT) | (1 << USART1_IRQ_BIT));
    unsafe { riscv::interrupt::enable() };
}

// ========================================
// Main Loop
// ========================================

fn report_outcome(outcome: LetterOutcome) {
    match outcome {
        LetterOutcome::Emitted { ch, ticks, dropped } => {
            debug!("'{}' -> {} ticks", ch, ticks);
            if dropped > 0 {
                warn!("Playback channel full, {} ticks dropped", dropped);
            }
        }
        LetterOutcome::Unmapped(_) | LetterOutcome::Aborted(_) => {}
        LetterOutcome::LockTimeout(ch) => {
            error!("Letter '{}' lost to lock timeout", ch);
        }
    }
}

fn main_loop() -> ! {
    info!("🚀 Main loop started");

    loop {
        match CONTEXT.translate_next(core::hint::spin_loop) {
            Some(outcome) => report_outcome(outcome),
            // TIM2 wakes the core at least once per period
            None => unsafe { riscv::asm::wfi() },
        }
    }
}

#[entry]
fn main() -> ! {
    // Volume must be on the actuator before the first tone
    let restored = critical_section::with(|cs| {
        CONTEXT.restore_volume(&mut *SETTINGS.borrow_ref_mut(cs))
    });
    match restored {
        Ok(volume) => info!("🔊 Volume {}", volume),
        Err(e) => {
            error!("Volume restore failed: {}", e);
            loop {
                unsafe { riscv::asm::wfi() };
            }
        }
    }

    hardware_init();

    info!("📡 CH32V203 Morse translator v{}", morse_core::VERSION);
    info!(
        "📊 Memory: context={}B",
        core::mem::size_of::<MorseContext<Ch32Actuator, 256, 1024>>()
    );

    main_loop()
}

// ========================================
// Interrupt Handlers
// ========================================

/// Base period elapsed
#[no_mangle]
extern "C" fn TIM2_IRQHandler() {
    // UIF is write-zero-to-clear
    reg_modify(TIM2_BASE + TIM_INTFR, |v| v & !1);
    CONTEXT.on_period();
}

/// Byte received from the host link
#[no_mangle]
extern "C" fn USART1_IRQHandler() {
    let status = reg_read(USART1_BASE + USART_STATR);
    // RXNE (5); reading DATAR also clears an overrun (3)
    if status & ((1 << 5) | (1 << 3)) == 0 {
        return;
    }
    let byte = reg_read(USART1_BASE + USART_DATAR) as u8;

    critical_section::with(|cs| {
        let message = FRAMER.borrow_ref_mut(cs).feed(byte);
        if let Some(message) = message {
            if let Err(e) = CONTEXT.dispatch(message, &mut *SETTINGS.borrow_ref_mut(cs)) {
                warn!("{} rejected: {}", message, e);
            }
        }
    });
}
