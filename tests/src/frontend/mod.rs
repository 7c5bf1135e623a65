//! AArch32 VFP translation tests: translate pre-decoded instructions
//! into IR, execute the IR on the interpreter in `interp`, and check
//! the resulting CPU state, guest memory and helper calls.


mod access;
mod arith;
mod sysreg;

use tcg_core::{Context, TranslationBlock};
use tcg_frontend::arm::cpu::{syn_uncategorized, ArmCpu, EXCP_UDEF};
use tcg_frontend::arm::features::{ArmCfg, ArmTbFlags};
use tcg_frontend::arm::insn::{ArgsVfp2, ArgsVfp3, VfpInsn};
use tcg_frontend::arm::{ArmDisasContext, ArmTranslator, TransOutcome};
use tcg_frontend::{translator_loop, TranslateError, TranslatorOps};
use tracing_subscriber::EnvFilter;

use self::interp::{Exception, Exit, Machine};

/// Guest address of the first instruction of every test block.
pub const PC: u64 = 0x8000;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// CPU model plus the mode a block is translated under.
#[derive(Clone, Copy)]
pub struct Setup {
    pub cfg: ArmCfg,
    pub flags: ArmTbFlags,
    pub cflags: u32,
}

impl Setup {
    /// A-profile at EL1 with FP enabled.
    pub fn a_profile(cfg: ArmCfg) -> Self {
        Self {
            cfg,
            flags: ArmTbFlags {
                vfp_enabled: true,
                current_el: 1,
                ..Default::default()
            },
            cflags: 0,
        }
    }

    /// M-profile, Secure, Thumb.
    pub fn m_profile(cfg: ArmCfg) -> Self {
        Self {
            cfg,
            flags: ArmTbFlags {
                thumb: true,
                vfp_enabled: true,
                v8m_secure: true,
                current_el: 1,
                ..Default::default()
            },
            cflags: 0,
        }
    }

    pub fn with_flags(mut self, f: impl FnOnce(&mut ArmTbFlags)) -> Self {
        f(&mut self.flags);
        self
    }

    fn tb(&self) -> TranslationBlock {
        TranslationBlock::new(PC, self.flags.pack(), self.cflags)
    }

    pub fn translate(&self, insns: &[VfpInsn]) -> Result<Context, TranslateError> {
        init_tracing();
        let mut ir = Context::new();
        let mut ctx = ArmDisasContext::new(&self.tb(), self.cfg, insns.iter().copied());
        translator_loop::<ArmTranslator>(&mut ctx, &mut ir)?;
        Ok(ir)
    }

    /// Translate `insns` and run the block on `m`.
    pub fn exec(&self, m: &mut Machine, insns: &[VfpInsn]) -> Exit {
        let ir = self.translate(insns).expect("translation failed");
        m.run(&ir)
    }

    /// Translate `insns` and run the block on a machine holding `cpu`.
    pub fn run(&self, cpu: ArmCpu, insns: &[VfpInsn]) -> (Machine, Exit) {
        let mut m = Machine::new(cpu);
        let exit = self.exec(&mut m, insns);
        (m, exit)
    }

    /// Hand a single instruction to the translator outside the
    /// translation loop.
    pub fn dispatch(&self, insn: VfpInsn) -> (Context, Result<TransOutcome, TranslateError>) {
        init_tracing();
        let mut ir = Context::new();
        let mut ctx = ArmDisasContext::new(&self.tb(), self.cfg, std::iter::empty::<VfpInsn>());
        <ArmTranslator as TranslatorOps>::init_disas_context(&mut ctx, &mut ir);
        let res = ctx.dispatch(&mut ir, &insn);
        (ir, res)
    }
}

// -- Shorthands ----------------------------------------------

pub fn vfp3(vd: u32, vn: u32, vm: u32) -> ArgsVfp3 {
    ArgsVfp3 { vd, vn, vm }
}

pub fn vfp2(vd: u32, vm: u32) -> ArgsVfp2 {
    ArgsVfp2 { vd, vm }
}

pub fn f32b(x: f32) -> u32 {
    x.to_bits()
}

pub fn f64b(x: f64) -> u64 {
    x.to_bits()
}

/// CPU with the given single-precision values in s0, s1, ...
pub fn cpu_with_s(vals: &[f32]) -> ArmCpu {
    let mut cpu = ArmCpu::new();
    for (i, &v) in vals.iter().enumerate() {
        cpu.set_sreg(i, f32b(v));
    }
    cpu
}

pub fn sf(cpu: &ArmCpu, reg: usize) -> f32 {
    f32::from_bits(cpu.sreg(reg))
}

pub fn df(cpu: &ArmCpu, reg: usize) -> f64 {
    f64::from_bits(cpu.dreg(reg))
}

/// The exit of a block whose instruction was UNDEFINED.
pub fn udef(el: u32) -> Exit {
    Exit::Exception(Exception {
        excp: EXCP_UDEF,
        syndrome: syn_uncategorized(),
        target_el: el,
    })
}

/// The exit of a block that ran `n` instructions and fell through.
pub fn fell_through(m: &Machine, n: u64) -> bool {
    m.cpu.regs[15] as u64 == PC + 4 * n
}
