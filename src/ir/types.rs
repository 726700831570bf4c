//! The IR type lattice.
//!
//! A closed set of value types: the universal boxed JavaScript value, the
//! untagged raw pointer, fixed-width integers, double-precision float, and a
//! `none` marker for instructions that produce no value. Types are plain
//! `Copy` values; identity is value equality.
//!
//! The platform-selection step is the explicit [`Platform`] value: it binds
//! `pint` to the pointer-width signed integer and reports which types exist
//! on the target (the 64-bit integer types are absent on 32-bit targets).

/// Pointer width of the compilation target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WordSize {
    W32,
    W64,
}

impl WordSize {
    pub fn bytes(self) -> usize {
        match self {
            WordSize::W32 => 4,
            WordSize::W64 => 8,
        }
    }

    pub fn bits(self) -> u8 {
        match self {
            WordSize::W32 => 32,
            WordSize::W64 => 64,
        }
    }
}

/// Target description fixed at the start of a compilation session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform {
    pub word: WordSize,
}

impl Platform {
    pub fn new(word: WordSize) -> Self {
        Platform { word }
    }

    /// The platform this compiler was itself built for.
    pub fn host() -> Self {
        #[cfg(target_pointer_width = "64")]
        let word = WordSize::W64;
        #[cfg(target_pointer_width = "32")]
        let word = WordSize::W32;
        Platform { word }
    }

    /// The platform-width signed integer: `i64` on 64-bit, `i32` on 32-bit.
    pub fn pint(self) -> IrType {
        match self.word {
            WordSize::W32 => IrType::I32,
            WordSize::W64 => IrType::I64,
        }
    }
}

/// An IR value type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IrType {
    /// No value (void instructions).
    None,
    /// Boxed JavaScript value: a pointer-sized word holding a tagged
    /// immediate or an object reference.
    Box,
    /// Untagged machine pointer.
    Rptr,
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    F64,
}

impl IrType {
    /// The printable name of this type, as used in mnemonic suffixes and in
    /// the textual IR form.
    pub fn name(self) -> &'static str {
        match self {
            IrType::None => "none",
            IrType::Box => "box",
            IrType::Rptr => "rptr",
            IrType::U8 => "u8",
            IrType::U16 => "u16",
            IrType::U32 => "u32",
            IrType::U64 => "u64",
            IrType::I8 => "i8",
            IrType::I16 => "i16",
            IrType::I32 => "i32",
            IrType::I64 => "i64",
            IrType::F64 => "f64",
        }
    }

    /// Parse a type name back into a type. Inverse of [`IrType::name`].
    pub fn from_name(name: &str) -> Option<IrType> {
        Some(match name {
            "none" => IrType::None,
            "box" => IrType::Box,
            "rptr" => IrType::Rptr,
            "u8" => IrType::U8,
            "u16" => IrType::U16,
            "u32" => IrType::U32,
            "u64" => IrType::U64,
            "i8" => IrType::I8,
            "i16" => IrType::I16,
            "i32" => IrType::I32,
            "i64" => IrType::I64,
            "f64" => IrType::F64,
            _ => return None,
        })
    }

    /// Size in bytes on the given platform. `box` and `rptr` are
    /// pointer-sized; `none` has no storage.
    pub fn size_bytes(self, word: WordSize) -> usize {
        match self {
            IrType::None => 0,
            IrType::Box | IrType::Rptr => word.bytes(),
            IrType::U8 | IrType::I8 => 1,
            IrType::U16 | IrType::I16 => 2,
            IrType::U32 | IrType::I32 => 4,
            IrType::U64 | IrType::I64 => 8,
            IrType::F64 => 8,
        }
    }

    pub fn size_bits(self, word: WordSize) -> u8 {
        (self.size_bytes(word) * 8) as u8
    }

    /// Whether this type exists on the given platform. The 64-bit integer
    /// types are removed from the lattice on 32-bit targets.
    pub fn available_on(self, word: WordSize) -> bool {
        match self {
            IrType::I64 | IrType::U64 => word == WordSize::W64,
            _ => true,
        }
    }

    /// True for the pointer-sized reference types (`box`, `rptr`).
    pub fn is_ptr(self) -> bool {
        matches!(self, IrType::Box | IrType::Rptr)
    }

    /// True for any integer width, signed or unsigned.
    pub fn is_int(self) -> bool {
        matches!(
            self,
            IrType::U8
                | IrType::U16
                | IrType::U32
                | IrType::U64
                | IrType::I8
                | IrType::I16
                | IrType::I32
                | IrType::I64
        )
    }

    pub fn is_signed(self) -> bool {
        matches!(self, IrType::I8 | IrType::I16 | IrType::I32 | IrType::I64)
    }

    pub fn is_unsigned(self) -> bool {
        matches!(self, IrType::U8 | IrType::U16 | IrType::U32 | IrType::U64)
    }

    /// True for the floating-point type.
    pub fn is_fp(self) -> bool {
        self == IrType::F64
    }

    /// True for integer or floating-point types.
    pub fn is_number(self) -> bool {
        self.is_int() || self.is_fp()
    }
}

impl std::fmt::Display for IrType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pint_tracks_pointer_width() {
        assert_eq!(Platform::new(WordSize::W64).pint(), IrType::I64);
        assert_eq!(Platform::new(WordSize::W32).pint(), IrType::I32);
    }

    #[test]
    fn sixty_four_bit_ints_absent_on_32bit() {
        assert!(!IrType::I64.available_on(WordSize::W32));
        assert!(!IrType::U64.available_on(WordSize::W32));
        assert!(IrType::I64.available_on(WordSize::W64));
        assert!(IrType::I32.available_on(WordSize::W32));
    }

    #[test]
    fn predicates() {
        assert!(IrType::Box.is_ptr());
        assert!(IrType::Rptr.is_ptr());
        assert!(!IrType::I64.is_ptr());
        assert!(IrType::U16.is_int());
        assert!(!IrType::F64.is_int());
        assert!(IrType::F64.is_fp());
        assert!(IrType::F64.is_number());
        assert!(IrType::I8.is_number());
        assert!(!IrType::Box.is_number());
        assert!(!IrType::None.is_number());
    }

    #[test]
    fn sizes_follow_platform() {
        assert_eq!(IrType::Box.size_bytes(WordSize::W64), 8);
        assert_eq!(IrType::Box.size_bytes(WordSize::W32), 4);
        assert_eq!(IrType::Rptr.size_bytes(WordSize::W64), 8);
        assert_eq!(IrType::F64.size_bytes(WordSize::W32), 8);
        assert_eq!(IrType::None.size_bytes(WordSize::W64), 0);
    }

    #[test]
    fn names_round_trip() {
        for ty in [
            IrType::None,
            IrType::Box,
            IrType::Rptr,
            IrType::U8,
            IrType::U16,
            IrType::U32,
            IrType::U64,
            IrType::I8,
            IrType::I16,
            IrType::I32,
            IrType::I64,
            IrType::F64,
        ] {
            assert_eq!(IrType::from_name(ty.name()), Some(ty));
        }
        assert_eq!(IrType::from_name("i128"), None);
    }
}
