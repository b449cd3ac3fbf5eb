//! Pin descriptors and board pin assignments.
//!
//! Single source of truth — every driver and the command engine reference
//! this module rather than hard-coding addresses. A [`PinDescriptor`] packs
//! a controllable line's full address into one byte:
//!
//! ```text
//! bit 7      bit 6      bits 5:3          bits 2:0
//! active     backend    device index      pin index
//! ```
//!
//! `device index` selects a native port (A..H) or an extended-IO expander
//! depending on the backend bit. A descriptor with the active bit clear is
//! reserved on this board variant: every operation on it reports
//! `NotSupported` without touching hardware.

// ---------------------------------------------------------------------------
// Descriptor codec
// ---------------------------------------------------------------------------

const PIN_MASK: u8 = 0x07;
const DEVICE_SHIFT: u8 = 3;
const DEVICE_MASK: u8 = 0x07 << DEVICE_SHIFT;
const BACKEND_BIT: u8 = 1 << 6;
const ACTIVE_BIT: u8 = 1 << 7;

/// Which driver a descriptor routes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Direct microcontroller port.
    NativeGpio,
    /// I2C port expander.
    ExtendedIo,
}

/// Packed one-byte address of a controllable IO line.
///
/// Decoding is total: any of the 256 byte values yields a descriptor; only
/// the active flag gates behavior downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PinDescriptor(u8);

impl PinDescriptor {
    /// Wrap a raw descriptor byte.
    pub const fn decode(raw: u8) -> Self {
        Self(raw)
    }

    /// Build an active native-GPIO descriptor for `port` (0 = A .. 7 = H).
    pub const fn native(port: u8, pin: u8) -> Self {
        Self::encode(Backend::NativeGpio, port, pin, true)
    }

    /// Build an active extended-IO descriptor for expander `device`.
    pub const fn extio(device: u8, pin: u8) -> Self {
        Self::encode(Backend::ExtendedIo, device, pin, true)
    }

    /// Pack the four fields. Inverse of the accessors below; used at board
    /// table build time.
    pub const fn encode(backend: Backend, device: u8, pin: u8, active: bool) -> Self {
        let backend_bit = match backend {
            Backend::NativeGpio => 0,
            Backend::ExtendedIo => BACKEND_BIT,
        };
        let active_bit = if active { ACTIVE_BIT } else { 0 };
        Self(active_bit | backend_bit | ((device & 0x07) << DEVICE_SHIFT) | (pin & PIN_MASK))
    }

    /// The raw descriptor byte.
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// Pin index within the port or expander (0–7).
    pub const fn pin(self) -> u8 {
        self.0 & PIN_MASK
    }

    /// Native port index or extended-IO device index (0–7).
    pub const fn device_index(self) -> u8 {
        (self.0 & DEVICE_MASK) >> DEVICE_SHIFT
    }

    /// Which backend drives this line.
    pub const fn backend(self) -> Backend {
        if self.0 & BACKEND_BIT == 0 {
            Backend::NativeGpio
        } else {
            Backend::ExtendedIo
        }
    }

    /// Whether the line exists on this board variant.
    pub const fn is_active(self) -> bool {
        self.0 & ACTIVE_BIT != 0
    }
}

// ---------------------------------------------------------------------------
// Native port indices
// ---------------------------------------------------------------------------

pub const PORT_B: u8 = 1;
pub const PORT_C: u8 = 2;
pub const PORT_D: u8 = 3;

// ---------------------------------------------------------------------------
// Board IO lines
// ---------------------------------------------------------------------------

/// Open-collector outputs OC1..OC4 on port C.
pub const OC1: PinDescriptor = PinDescriptor::native(PORT_C, 0);
pub const OC2: PinDescriptor = PinDescriptor::native(PORT_C, 1);
pub const OC3: PinDescriptor = PinDescriptor::native(PORT_C, 2);
pub const OC4: PinDescriptor = PinDescriptor::native(PORT_C, 3);

/// Relay drivers RL1..RL4 on port D.
pub const RL1: PinDescriptor = PinDescriptor::native(PORT_D, 4);
pub const RL2: PinDescriptor = PinDescriptor::native(PORT_D, 5);
pub const RL3: PinDescriptor = PinDescriptor::native(PORT_D, 6);
pub const RL4: PinDescriptor = PinDescriptor::native(PORT_D, 7);

/// Extended IO lines on expander 0.
pub const EIO0: PinDescriptor = PinDescriptor::extio(0, 0);
pub const EIO1: PinDescriptor = PinDescriptor::extio(0, 1);
pub const EIO2: PinDescriptor = PinDescriptor::extio(0, 2);
pub const EIO3: PinDescriptor = PinDescriptor::extio(0, 3);
pub const EIO4: PinDescriptor = PinDescriptor::extio(0, 4);
pub const EIO5: PinDescriptor = PinDescriptor::extio(0, 5);
pub const EIO6: PinDescriptor = PinDescriptor::extio(0, 6);
pub const EIO7: PinDescriptor = PinDescriptor::extio(0, 7);

/// Placeholder for lines absent on this board variant.
pub const RESERVED: PinDescriptor = PinDescriptor::decode(0);

/// Number of controllable outputs.
pub const OUTPUT_COUNT: usize = 16;

/// Ordered output table: the logical output index used by the protocol
/// layer maps to a descriptor through this table.
pub const OUTPUT_TABLE: [PinDescriptor; OUTPUT_COUNT] = [
    OC1, OC2, OC3, OC4, //
    RL1, RL2, RL3, RL4, //
    EIO0, EIO1, EIO2, EIO3, EIO4, EIO5, EIO6, EIO7,
];
