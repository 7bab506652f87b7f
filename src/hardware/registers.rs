use crate::hardware::{FILE_REGISTER_COUNT, PC_MASK};
use std::fmt::{Debug, Display, Formatter};

const REGISTER_SELECT_MASK: u8 = 0x7F;
const PCLATH_MASK: u8 = 0x1F;

/// File registers with architectural meaning in bank 0.
#[repr(u8)]
#[derive(enumn::N, displaydoc::Display, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialRegister {
    /// INDF
    Indf = 0x00,
    /// TMR0
    Tmr0 = 0x01,
    /// PCL
    Pcl = 0x02,
    /// STATUS
    Status = 0x03,
    /// FSR
    Fsr = 0x04,
    /// PORTA
    PortA = 0x05,
    /// PORTB
    PortB = 0x06,
    /// EEDATA
    EeData = 0x08,
    /// EEADR
    EeAdr = 0x09,
    /// PCLATH
    Pclath = 0x0A,
    /// INTCON
    Intcon = 0x0B,
}
impl SpecialRegister {
    #[must_use]
    pub const fn address(self) -> u8 {
        self as u8
    }
}

/// Content of the STATUS register.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct Status(u8);

impl Status {
    pub const C: u8 = 1 << 0;
    pub const DC: u8 = 1 << 1;
    pub const Z: u8 = 1 << 2;
    /// Power-down, cleared by SLEEP.
    pub const PD: u8 = 1 << 3;
    /// Time-out, cleared by a watchdog time-out.
    pub const TO: u8 = 1 << 4;
    pub const RP0: u8 = 1 << 5;
    pub const RP1: u8 = 1 << 6;
    pub const IRP: u8 = 1 << 7;
    /// Bits no instruction can write through the file register space.
    pub const READ_ONLY: u8 = Self::TO | Self::PD;
    pub const POWER_ON: Self = Self(Self::TO | Self::PD);

    const NAMES: [(u8, &'static str); 8] = [
        (Self::IRP, "IRP"),
        (Self::RP1, "RP1"),
        (Self::RP0, "RP0"),
        (Self::TO, "TO"),
        (Self::PD, "PD"),
        (Self::Z, "Z"),
        (Self::DC, "DC"),
        (Self::C, "C"),
    ];

    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }
    #[must_use]
    pub const fn is_set(self, flag: u8) -> bool {
        self.0 & flag != 0
    }
    #[must_use]
    pub const fn carry(self) -> bool {
        self.is_set(Self::C)
    }
    #[must_use]
    pub const fn digit_carry(self) -> bool {
        self.is_set(Self::DC)
    }
    #[must_use]
    pub const fn zero(self) -> bool {
        self.is_set(Self::Z)
    }
    #[must_use]
    pub const fn power_down(self) -> bool {
        self.is_set(Self::PD)
    }
    #[must_use]
    pub const fn time_out(self) -> bool {
        self.is_set(Self::TO)
    }
    /// Returns a copy with `flag` set or cleared.
    #[must_use]
    pub const fn with(self, flag: u8, value: bool) -> Self {
        if value {
            Self(self.0 | flag)
        } else {
            Self(self.0 & !flag)
        }
    }
}

/// Formats all flags from IRP down to C, a cleared flag is shown as `-`.
impl Display for Status {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (idx, (flag, name)) in Self::NAMES.iter().enumerate() {
            if idx > 0 {
                f.write_str(" ")?;
            }
            f.write_str(if self.is_set(*flag) { *name } else { "-" })?;
        }
        Ok(())
    }
}
impl Debug for Status {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Status({:#04X}: {self})", self.0)
    }
}

/// The working register W and the 128 file registers of bank 0.
///
/// STATUS, PCL, PCLATH and the other special function registers live in the same address
/// space as the general purpose registers.
pub struct Registers {
    w: u8,
    file: [u8; FILE_REGISTER_COUNT],
}

impl Debug for Registers {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registers")
            .field("w", &format_args!("{:#04X}", self.w))
            .field("pc", &format_args!("{:#06X}", self.pc()))
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

impl Registers {
    #[must_use]
    pub fn new() -> Self {
        let mut res = Self {
            w: 0,
            file: [0; FILE_REGISTER_COUNT],
        };
        res.initialize_all();
        res
    }

    /// Applies the power-on reset values.
    ///
    /// Only STATUS, PCL, PCLATH and INTCON have mandated values, W and the general purpose
    /// registers keep whatever they hold.
    pub fn initialize_all(&mut self) {
        self.set_status(Status::POWER_ON);
        self.file[usize::from(SpecialRegister::Pcl.address())] = 0;
        self.file[usize::from(SpecialRegister::Pclath.address())] = 0;
        self.file[usize::from(SpecialRegister::Intcon.address())] = 0;
    }

    /// Maps a register-select field to the cell it accesses.
    ///
    /// INDF selects the register FSR points to.
    #[must_use]
    pub fn resolve(&self, index: u8) -> u8 {
        let index = index & REGISTER_SELECT_MASK;
        if index == SpecialRegister::Indf.address() {
            self.file[usize::from(SpecialRegister::Fsr.address())] & REGISTER_SELECT_MASK
        } else {
            index
        }
    }

    #[must_use]
    pub fn get(&self, index: u8) -> u8 {
        let address = self.resolve(index);
        // INDF through FSR = 0 reads as zero
        if address == SpecialRegister::Indf.address() {
            0
        } else {
            self.file[usize::from(address)]
        }
    }

    pub fn set(&mut self, index: u8, value: u8) {
        let address = self.resolve(index);
        if address != SpecialRegister::Indf.address() {
            self.file[usize::from(address)] = value;
        }
    }

    #[must_use]
    pub const fn w(&self) -> u8 {
        self.w
    }
    pub const fn set_w(&mut self, value: u8) {
        self.w = value;
    }

    #[must_use]
    pub const fn status(&self) -> Status {
        Status(self.file[SpecialRegister::Status as usize])
    }
    pub const fn set_status(&mut self, status: Status) {
        self.file[SpecialRegister::Status as usize] = status.0;
    }

    /// The 13-bit program counter assembled from PCLATH and PCL.
    #[must_use]
    pub fn pc(&self) -> u16 {
        let high = u16::from(self.file[usize::from(SpecialRegister::Pclath.address())]);
        let low = u16::from(self.file[usize::from(SpecialRegister::Pcl.address())]);
        ((high << 8) | low) & PC_MASK
    }
    /// Splits `pc` into PCL and the PCLATH latch.
    #[expect(clippy::cast_possible_truncation, reason = "split into low and high byte")]
    pub fn set_pc(&mut self, pc: u16) {
        let pc = pc & PC_MASK;
        self.file[usize::from(SpecialRegister::Pcl.address())] = pc as u8;
        self.file[usize::from(SpecialRegister::Pclath.address())] = (pc >> 8) as u8 & PCLATH_MASK;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use googletest::prelude::*;

    #[gtest]
    pub fn test_power_on_defaults() {
        let regs = Registers::new();
        expect_that!(regs.status(), eq(Status::POWER_ON));
        expect_that!(regs.status().power_down(), eq(true));
        expect_that!(regs.status().time_out(), eq(true));
        expect_that!(regs.pc(), eq(0));
        expect_that!(regs.get(SpecialRegister::Intcon.address()), eq(0));
    }
    #[gtest]
    pub fn test_initialize_all_keeps_general_purpose_registers() {
        let mut regs = Registers::new();
        regs.set(0x20, 0x42);
        regs.set_w(0x17);
        regs.set_pc(0x123);
        regs.set_status(Status::from_bits(0xFF));
        regs.initialize_all();
        expect_that!(regs.get(0x20), eq(0x42));
        expect_that!(regs.w(), eq(0x17));
        expect_that!(regs.pc(), eq(0));
        expect_that!(regs.status(), eq(Status::POWER_ON));
    }
    #[gtest]
    pub fn test_register_select_uses_low_seven_bits() {
        let mut regs = Registers::new();
        regs.set(0x80 | 0x21, 0x99);
        expect_that!(regs.get(0x21), eq(0x99));
    }
    #[gtest]
    pub fn test_pc_split_and_mask() {
        let mut regs = Registers::new();
        regs.set_pc(0x1ABC);
        expect_that!(regs.get(SpecialRegister::Pcl.address()), eq(0xBC));
        expect_that!(regs.get(SpecialRegister::Pclath.address()), eq(0x1A));
        expect_that!(regs.pc(), eq(0x1ABC));

        regs.set_pc(0xFFFF);
        expect_that!(regs.pc(), eq(0x1FFF));
        regs.set(SpecialRegister::Pclath.address(), 0xFF);
        expect_that!(regs.pc(), eq(0x1FFF));
    }
    #[gtest]
    pub fn test_indirect_addressing() {
        let mut regs = Registers::new();
        regs.set(SpecialRegister::Fsr.address(), 0x30);
        regs.set(SpecialRegister::Indf.address(), 0x55);
        expect_that!(regs.get(0x30), eq(0x55));
        expect_that!(regs.resolve(SpecialRegister::Indf.address()), eq(0x30));
        expect_that!(regs.get(SpecialRegister::Indf.address()), eq(0x55));
    }
    #[gtest]
    pub fn test_indirect_addressing_of_indf_itself() {
        let mut regs = Registers::new();
        regs.set(SpecialRegister::Fsr.address(), 0x00);
        regs.set(SpecialRegister::Indf.address(), 0x55);
        expect_that!(regs.get(SpecialRegister::Indf.address()), eq(0));
    }
    #[gtest]
    pub fn test_status_format() {
        expect_that!(Status::POWER_ON.to_string(), eq("- - - TO PD - - -"));
        let status = Status::from_bits(0).with(Status::Z, true).with(Status::C, true);
        expect_that!(status.to_string(), eq("- - - - - Z - C"));
        expect_that!(status.with(Status::Z, false).zero(), eq(false));
    }
    #[gtest]
    pub fn test_special_register_names() {
        expect_that!(SpecialRegister::n(0x0A), eq(Some(SpecialRegister::Pclath)));
        expect_that!(SpecialRegister::n(0x07), eq(None));
        expect_that!(SpecialRegister::PortB.to_string(), eq("PORTB"));
    }
}
