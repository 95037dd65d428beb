//! Byte-local bit fields and fixed-width register values.
//!
//! A [`Field`] names a run of 1 to 8 bits that lives entirely inside one byte of
//! a register of up to 64 bits. Offsets count from the least significant bit of
//! the whole register, so byte index 0 is the *last* byte on the wire.

/// Location of a bit field inside a register
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Field {
    offset: u8,
    width: u8,
}

impl Field {
    /// Creates a field descriptor.
    ///
    /// Panics if `offset >= 64`, `width` is outside `1..=8`, or the field would
    /// cross a byte boundary. Used in a `const` item this is a compile error.
    pub const fn new(offset: u8, width: u8) -> Self {
        assert!(offset < 64, "field offset must be below 64");
        assert!(width >= 1 && width <= 8, "field width must be 1..=8");
        assert!(
            offset / 8 == (offset + width - 1) / 8,
            "field must not cross a byte boundary"
        );
        Field { offset, width }
    }

    /// Single bit field
    pub const fn bit(offset: u8) -> Self {
        Field::new(offset, 1)
    }

    pub const fn offset(&self) -> u8 {
        self.offset
    }

    pub const fn width(&self) -> u8 {
        self.width
    }

    /// Index of the byte holding this field, 0 being the least significant
    pub const fn byte_index(&self) -> u8 {
        self.offset / 8
    }

    /// Shift of the field inside its byte
    pub const fn shift(&self) -> u8 {
        self.offset % 8
    }

    /// Right-aligned mask of the field's width
    pub const fn mask(&self) -> u8 {
        (((1u16 << self.width) - 1) & 0xFF) as u8
    }

    /// Mask of the field inside its byte
    pub const fn byte_mask(&self) -> u8 {
        self.mask() << self.shift()
    }

    /// Mask of the field inside the full 64-bit value
    pub const fn mask64(&self) -> u64 {
        (self.byte_mask() as u64) << (self.byte_index() as u32 * 8)
    }

    pub const fn clear(&self, value: u64) -> u64 {
        value & !self.mask64()
    }

    pub const fn extract(&self, value: u64) -> u8 {
        ((value & self.mask64()) >> self.offset) as u8
    }

    /// Writes `x` into the field; bits beyond the field width are dropped.
    pub const fn insert(&self, x: u8, value: u64) -> u64 {
        self.clear(value) | (((x & self.mask()) as u64) << self.offset)
    }
}

/// Big-endian serialization of the low `N` bytes of `value`
pub fn pack_be<const N: usize>(value: u64) -> [u8; N] {
    let mut out = [0u8; N];
    for (i, byte) in out.iter_mut().enumerate() {
        let shift = (N - 1 - i) * 8;
        *byte = (value >> shift) as u8;
    }
    out
}

/// An `N` byte hardware register value, always masked to `N * 8` bits
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RegisterValue<const N: usize> {
    raw: u64,
}

impl<const N: usize> RegisterValue<N> {
    pub const MASK: u64 = {
        assert!(N >= 1 && N <= 8, "register length must be 1..=8 bytes");
        if N == 8 {
            u64::MAX
        } else {
            (1u64 << (N * 8)) - 1
        }
    };

    pub const LEN: usize = N;

    pub const fn new(raw: u64) -> Self {
        RegisterValue {
            raw: raw & Self::MASK,
        }
    }

    pub const fn zero() -> Self {
        Self::new(0)
    }

    pub const fn raw(&self) -> u64 {
        self.raw
    }

    pub fn clear(&mut self, field: Field) -> &mut Self {
        self.raw = field.clear(self.raw) & Self::MASK;
        self
    }

    pub fn extract(&self, field: Field) -> u8 {
        field.extract(self.raw)
    }

    pub fn insert(&mut self, field: Field, x: u8) -> &mut Self {
        self.raw = field.insert(x, self.raw) & Self::MASK;
        self
    }

    /// Single-bit convenience; `true` fills every bit of the field.
    pub fn set(&mut self, field: Field, on: bool) -> &mut Self {
        self.insert(field, if on { 0xFF } else { 0 })
    }

    pub fn is_set(&self, field: Field) -> bool {
        self.extract(field) != 0
    }

    /// Spreads `word` over `fields`, least significant field first.
    pub fn insert_wide(&mut self, fields: &[Field], mut word: u64) -> &mut Self {
        for field in fields {
            self.insert(*field, word as u8);
            word >>= field.width();
        }
        self
    }

    /// Gathers a word previously spread with [`insert_wide`](Self::insert_wide)
    pub fn extract_wide(&self, fields: &[Field]) -> u64 {
        let mut word = 0u64;
        let mut shift = 0u32;
        for field in fields {
            word |= (self.extract(*field) as u64) << shift;
            shift += field.width() as u32;
        }
        word
    }

    pub fn to_bytes(&self) -> [u8; N] {
        pack_be::<N>(self.raw & Self::MASK)
    }

    /// Inverse of [`to_bytes`](Self::to_bytes). Only the last `N` bytes of a
    /// longer slice are used.
    pub fn from_be_bytes(bytes: &[u8]) -> Self {
        let start = bytes.len().saturating_sub(N);
        let raw = bytes[start..]
            .iter()
            .fold(0u64, |acc, b| (acc << 8) | *b as u64);
        Self::new(raw)
    }
}

impl<const N: usize> From<RegisterValue<N>> for u64 {
    fn from(value: RegisterValue<N>) -> Self {
        value.raw
    }
}

// Tests
