// apps/pb_cli/src/commands/validate.rs

//! 配置验证命令
//!
//! 收集算例配置中的全部问题，并实际构建一次群体平衡模型，
//! 以发现未注册的子模型或缺失的系数；最后试算一个时间步，
//! 报告子模型产生的非有限源项。

use anyhow::{bail, Context, Result};
use clap::Args;
use pb_config::CaseConfig;
use pb_foundation::validation::{
    check_finite_field, ValidationError, ValidationReport, ValidationWarning,
};
use pb_physics::{FluidSystem, LocalImplicitSolver, PhaseSystem, PopulationBalanceModel};
use std::path::PathBuf;
use tracing::{error, info, warn};

/// 验证参数
#[derive(Args)]
pub struct ValidateArgs {
    /// 算例配置文件路径
    #[arg(short, long)]
    pub case: PathBuf,

    /// 严格模式（警告也视为错误）
    #[arg(long)]
    pub strict: bool,
}

/// 执行验证命令
pub fn execute(args: ValidateArgs) -> Result<()> {
    info!("=== PolyBal 配置验证 ===");
    println!("\n检查配置文件: {}", args.case.display());

    let content = std::fs::read_to_string(&args.case)
        .with_context(|| format!("无法读取配置文件: {}", args.case.display()))?;
    let case: CaseConfig = match serde_json::from_str(&content) {
        Ok(case) => case,
        Err(e) => bail!("JSON 解析错误: {}", e),
    };

    let report = check_case(&case);
    print_report(&report, args.strict)
}

/// 收集配置问题；配置层无误时再尝试构建模型
fn check_case(case: &CaseConfig) -> ValidationReport {
    let mut report = case.validation_report();
    if report.has_errors() {
        return report;
    }
    if let Err(e) = case.population_balance.validate() {
        report.add_error(ValidationError::Consistency { message: e.to_string() });
        return report;
    }

    let mut fluid = match PhaseSystem::from_case(case) {
        Ok(fluid) => fluid,
        Err(e) => {
            report.add_error(ValidationError::Consistency { message: e.to_string() });
            return report;
        }
    };
    let mut pbm = match PopulationBalanceModel::new(&case.population_balance, &fluid) {
        Ok(pbm) => pbm,
        Err(e) => {
            report.add_error(ValidationError::Consistency { message: e.to_string() });
            return report;
        }
    };
    if pbm.n_groups() == 1 {
        report.add_warning(ValidationWarning::Custom {
            message: "只有一个尺寸组，聚并与破碎不起作用".into(),
        });
    }
    println!("  ✓ 模型构建成功: {} 个组", pbm.n_groups());

    trial_step(&mut fluid, &mut pbm, &mut report);
    report
}

/// 试算一个时间步：子模型不做截断，非有限的速率会出现在装配的源项里
fn trial_step(fluid: &mut PhaseSystem, pbm: &mut PopulationBalanceModel, report: &mut ValidationReport) {
    fluid.advance_time();
    fluid.set_final_iteration(true);
    let fluid: &PhaseSystem = fluid;

    let solver = LocalImplicitSolver::default();
    if let Err(e) = pbm.solve(fluid, &solver).and_then(|_| pbm.correct(fluid)) {
        report.add_error(ValidationError::Consistency {
            message: format!("试算一步失败: {}", e),
        });
        return;
    }

    let mut bad = 0;
    let sources = pbm.sources();
    for group in pbm.groups() {
        let name = group.field_name();
        bad += check_finite_field(report, &format!("Su.{}", name), sources.su(group.index).as_slice());
        bad += check_finite_field(report, &format!("Sp.{}", name), sources.sp(group.index).as_slice());
        bad += check_finite_field(report, &name, group.f.as_slice());
    }
    if bad == 0 {
        println!("  ✓ 试算一步 (Δt = {:e} s) 无非有限值", fluid.delta_t());
    }
}

fn print_report(report: &ValidationReport, strict: bool) -> Result<()> {
    println!("\n=== 验证结果 ===");

    if report.has_errors() {
        println!("\n错误 ({}):", report.error_count());
        for err in &report.errors {
            error!("  ✗ {}", err);
            println!("  ✗ {}", err);
        }
    }

    if report.has_warnings() {
        println!("\n警告 ({}):", report.warning_count());
        for warning in &report.warnings {
            warn!("  ⚠ {}", warning);
            println!("  ⚠ {}", warning);
        }
    }

    let success = if strict {
        report.is_valid() && !report.has_warnings()
    } else {
        report.is_valid()
    };

    if success {
        println!("\n✓ 验证通过");
        Ok(())
    } else {
        println!("\n✗ 验证失败");
        bail!(
            "验证失败：发现 {} 个错误，{} 个警告",
            report.error_count(),
            report.warning_count()
        )
    }
}
