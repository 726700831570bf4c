//! x86-64 general-purpose register set.
//!
//! Registers are named by width the way the emitter needs them (`rax`,
//! `eax`, `ax`, `al`); the policy descriptors hand out `&'static [Reg]`
//! constraint sets from here.

/// A general-purpose x86-64 register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reg {
    Rax,
    Rcx,
    Rdx,
    Rbx,
    Rsp,
    Rbp,
    Rsi,
    Rdi,
    R8,
    R9,
    R10,
    R11,
    R12,
    R13,
    R14,
    R15,
}

impl Reg {
    /// The register's name at the given operand width (64/32/16/8 bits).
    pub fn name(self, bits: u8) -> &'static str {
        use Reg::*;
        match (self, bits) {
            (Rax, 64) => "rax",
            (Rax, 32) => "eax",
            (Rax, 16) => "ax",
            (Rax, 8) => "al",
            (Rcx, 64) => "rcx",
            (Rcx, 32) => "ecx",
            (Rcx, 16) => "cx",
            (Rcx, 8) => "cl",
            (Rdx, 64) => "rdx",
            (Rdx, 32) => "edx",
            (Rdx, 16) => "dx",
            (Rdx, 8) => "dl",
            (Rbx, 64) => "rbx",
            (Rbx, 32) => "ebx",
            (Rbx, 16) => "bx",
            (Rbx, 8) => "bl",
            (Rsp, 64) => "rsp",
            (Rsp, 32) => "esp",
            (Rsp, 16) => "sp",
            (Rsp, 8) => "spl",
            (Rbp, 64) => "rbp",
            (Rbp, 32) => "ebp",
            (Rbp, 16) => "bp",
            (Rbp, 8) => "bpl",
            (Rsi, 64) => "rsi",
            (Rsi, 32) => "esi",
            (Rsi, 16) => "si",
            (Rsi, 8) => "sil",
            (Rdi, 64) => "rdi",
            (Rdi, 32) => "edi",
            (Rdi, 16) => "di",
            (Rdi, 8) => "dil",
            (R8, 64) => "r8",
            (R8, 32) => "r8d",
            (R8, 16) => "r8w",
            (R8, 8) => "r8b",
            (R9, 64) => "r9",
            (R9, 32) => "r9d",
            (R9, 16) => "r9w",
            (R9, 8) => "r9b",
            (R10, 64) => "r10",
            (R10, 32) => "r10d",
            (R10, 16) => "r10w",
            (R10, 8) => "r10b",
            (R11, 64) => "r11",
            (R11, 32) => "r11d",
            (R11, 16) => "r11w",
            (R11, 8) => "r11b",
            (R12, 64) => "r12",
            (R12, 32) => "r12d",
            (R12, 16) => "r12w",
            (R12, 8) => "r12b",
            (R13, 64) => "r13",
            (R13, 32) => "r13d",
            (R13, 16) => "r13w",
            (R13, 8) => "r13b",
            (R14, 64) => "r14",
            (R14, 32) => "r14d",
            (R14, 16) => "r14w",
            (R14, 8) => "r14b",
            (R15, 64) => "r15",
            (R15, 32) => "r15d",
            (R15, 16) => "r15w",
            (R15, 8) => "r15b",
            _ => panic!("no {}-bit name for {:?}", bits, self),
        }
    }
}

/// Constraint set: the accumulator (`mul`/`div` operand 0 and quotient).
pub static RAX_SET: [Reg; 1] = [Reg::Rax];
/// Constraint set: the high half / remainder register.
pub static RDX_SET: [Reg; 1] = [Reg::Rdx];
/// Constraint set: the shift-count register.
pub static RCX_SET: [Reg; 1] = [Reg::Rcx];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_names() {
        assert_eq!(Reg::Rax.name(64), "rax");
        assert_eq!(Reg::Rax.name(32), "eax");
        assert_eq!(Reg::Rax.name(8), "al");
        assert_eq!(Reg::R8.name(32), "r8d");
        assert_eq!(Reg::Rsi.name(8), "sil");
    }
}
