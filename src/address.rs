//! Bus address selection
//!
//! A single chip can be reached on its primary address and on up to four
//! alternate addresses (All Call and three subaddresses). Every driver
//! operation takes an [`AddressType`] that picks which of the stored
//! addresses a write goes to, so one driver instance can talk to its own
//! chip or broadcast to a whole group.
//!
//! The alternate addresses only work once the chip has been told to answer
//! on them (MODE1 ALLCALL/SUB1..SUB3). The driver does not check this.

/// I2C addresses are 7 bits wide
const ADDRESS_MASK: u8 = 0x7F;

/// Default primary bus address (all address pins low)
pub const DEFAULT_ADDRESS: u8 = 0x40;
/// Power-on LED All Call address
pub const DEFAULT_ALL_CALL_ADDRESS: u8 = 0x70;
/// Power-on subaddress 1
pub const DEFAULT_SUB_ADDRESS_1: u8 = 0x71;
/// Power-on subaddress 2
pub const DEFAULT_SUB_ADDRESS_2: u8 = 0x72;
/// Power-on subaddress 3
pub const DEFAULT_SUB_ADDRESS_3: u8 = 0x73;

/// Which stored bus address an operation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AddressType {
    /// The chip's own primary address
    #[default]
    Normal,
    /// The LED All Call address
    AllCall,
    /// Subaddress 1
    SubCall1,
    /// Subaddress 2
    SubCall2,
    /// Subaddress 3
    SubCall3,
}

/// One of the four programmable alternate addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlternateAddress {
    /// ALLCALLADR register
    AllCall,
    /// SUBADR1 register
    Sub1,
    /// SUBADR2 register
    Sub2,
    /// SUBADR3 register
    Sub3,
}

impl From<AlternateAddress> for AddressType {
    fn from(alternate: AlternateAddress) -> Self {
        match alternate {
            AlternateAddress::AllCall => Self::AllCall,
            AlternateAddress::Sub1 => Self::SubCall1,
            AlternateAddress::Sub2 => Self::SubCall2,
            AlternateAddress::Sub3 => Self::SubCall3,
        }
    }
}

/// The five bus addresses a driver routes writes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AddressConfig {
    /// 7-bit primary address
    pub primary: u8,
    /// 7-bit LED All Call address
    pub all_call: u8,
    /// 7-bit subaddress 1
    pub sub1: u8,
    /// 7-bit subaddress 2
    pub sub2: u8,
    /// 7-bit subaddress 3
    pub sub3: u8,
}

impl Default for AddressConfig {
    fn default() -> Self {
        Self {
            primary: DEFAULT_ADDRESS,
            all_call: DEFAULT_ALL_CALL_ADDRESS,
            sub1: DEFAULT_SUB_ADDRESS_1,
            sub2: DEFAULT_SUB_ADDRESS_2,
            sub3: DEFAULT_SUB_ADDRESS_3,
        }
    }
}

impl AddressConfig {
    /// Default configuration with a different primary address.
    ///
    /// Like the `with_*` builders, only the low 7 bits are kept.
    pub fn new(primary: u8) -> Self {
        Self {
            primary: primary & ADDRESS_MASK,
            ..Self::default()
        }
    }

    /// Sets the LED All Call address. Only the low 7 bits are kept.
    pub fn with_all_call(mut self, address: u8) -> Self {
        self.all_call = address & ADDRESS_MASK;
        self
    }

    /// Sets subaddress 1. Only the low 7 bits are kept.
    pub fn with_sub1(mut self, address: u8) -> Self {
        self.sub1 = address & ADDRESS_MASK;
        self
    }

    /// Sets subaddress 2. Only the low 7 bits are kept.
    pub fn with_sub2(mut self, address: u8) -> Self {
        self.sub2 = address & ADDRESS_MASK;
        self
    }

    /// Sets subaddress 3. Only the low 7 bits are kept.
    pub fn with_sub3(mut self, address: u8) -> Self {
        self.sub3 = address & ADDRESS_MASK;
        self
    }

    /// Resolves a selector to the stored bus address.
    pub fn resolve(&self, address_type: AddressType) -> u8 {
        match address_type {
            AddressType::Normal => self.primary,
            AddressType::AllCall => self.all_call,
            AddressType::SubCall1 => self.sub1,
            AddressType::SubCall2 => self.sub2,
            AddressType::SubCall3 => self.sub3,
        }
    }

    pub(crate) fn set_alternate(&mut self, alternate: AlternateAddress, address: u8) {
        let address = address & ADDRESS_MASK;
        match alternate {
            AlternateAddress::AllCall => self.all_call = address,
            AlternateAddress::Sub1 => self.sub1 = address,
            AlternateAddress::Sub2 => self.sub2 = address,
            AlternateAddress::Sub3 => self.sub3 = address,
        }
    }
}
