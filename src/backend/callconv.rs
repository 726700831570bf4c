//! Calling-convention descriptions.
//!
//! Two conventions exist: the System V "c" convention used when calling
//! out to runtime primitives written in C, and the VM's own convention
//! used between compiled JavaScript functions. The emitter only needs the
//! return register and the callee-save set; argument registers are read by
//! the external register allocator when it builds its plan.

use super::regs::Reg;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallConvKind {
    /// System V AMD64, for calls into C runtime primitives.
    C,
    /// The VM-internal convention between compiled functions.
    Vela,
}

#[derive(Debug)]
pub struct CallConv {
    pub name: &'static str,
    pub ret_reg: Reg,
    pub arg_regs: &'static [Reg],
    pub callee_save: &'static [Reg],
}

static C_CONV: CallConv = CallConv {
    name: "c",
    ret_reg: Reg::Rax,
    arg_regs: &[Reg::Rdi, Reg::Rsi, Reg::Rdx, Reg::Rcx, Reg::R8, Reg::R9],
    callee_save: &[Reg::Rbx, Reg::Rbp, Reg::R12, Reg::R13, Reg::R14, Reg::R15],
};

// The VM convention reserves r15 for the runtime context pointer, so it is
// not a callee-save here; compiled code never treats it as free.
static VELA_CONV: CallConv = CallConv {
    name: "vela",
    ret_reg: Reg::Rax,
    arg_regs: &[Reg::Rsi, Reg::Rdi, Reg::Rdx, Reg::Rcx, Reg::R8, Reg::R9],
    callee_save: &[Reg::Rbx, Reg::Rbp, Reg::R12, Reg::R13, Reg::R14],
};

pub fn call_conv(kind: CallConvKind) -> &'static CallConv {
    match kind {
        CallConvKind::C => &C_CONV,
        CallConvKind::Vela => &VELA_CONV,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conventions_resolve() {
        assert_eq!(call_conv(CallConvKind::C).ret_reg, Reg::Rax);
        assert_eq!(call_conv(CallConvKind::C).arg_regs[0], Reg::Rdi);
        assert!(!call_conv(CallConvKind::Vela).callee_save.contains(&Reg::R15));
    }
}
