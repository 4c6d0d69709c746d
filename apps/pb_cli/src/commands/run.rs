// apps/pb_cli/src/commands/run.rs

//! 运行算例命令
//!
//! 每个时间步：推进时间层 → 外迭代内求解组分数 → 按质量传递更新分散相
//! 体积分数 → 校正并输出诊断量。

use anyhow::{Context, Result};
use clap::Args;
use pb_config::CaseConfig;
use pb_physics::{
    FluidSystem, IntegrationMethod, LocalImplicitSolver, PhaseSystem, PopulationBalanceModel,
    ScalarField,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// 运行算例参数
#[derive(Args)]
pub struct RunArgs {
    /// 算例配置文件路径
    #[arg(short, long)]
    pub case: PathBuf,

    /// 输出目录（覆盖配置）
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// 结束时间 [秒]（覆盖配置）
    #[arg(short = 't', long)]
    pub end_time: Option<f64>,

    /// 时间步长 [秒]（覆盖配置）
    #[arg(long)]
    pub dt: Option<f64>,

    /// 输出间隔 [秒]（覆盖配置）
    #[arg(short, long)]
    pub write_interval: Option<f64>,

    /// 使用显式 Euler 积分组分数
    #[arg(long)]
    pub explicit: bool,

    /// 从该目录读入组分数场作为初值
    #[arg(long)]
    pub restart: Option<PathBuf>,
}

/// 执行运行命令
pub fn execute(args: RunArgs) -> Result<()> {
    info!("=== PolyBal 算例启动 ===");

    let mut case = CaseConfig::from_file(&args.case)
        .with_context(|| format!("读取算例配置失败: {}", args.case.display()))?;
    if let Some(dir) = args.output {
        case.output.directory = dir;
    }
    if let Some(t) = args.end_time {
        case.end_time = t;
    }
    if let Some(dt) = args.dt {
        case.delta_t = dt;
    }
    if let Some(interval) = args.write_interval {
        case.output.interval = interval;
    }

    let mut fluid = PhaseSystem::from_case(&case).context("构建相系统失败")?;
    let mut pbm = PopulationBalanceModel::new(&case.population_balance, &fluid)
        .context("构建群体平衡模型失败")?;
    if let Some(dir) = &args.restart {
        let t = pbm
            .read_fields(dir, &fluid)
            .with_context(|| format!("读入组分数场失败: {}", dir.display()))?;
        info!("从 {} 读入组分数场 (t = {})", dir.display(), t);
    }

    let method = if args.explicit || !case.implicit {
        IntegrationMethod::Explicit
    } else {
        IntegrationMethod::ImplicitEuler
    };
    let solver = LocalImplicitSolver::new(method);
    info!(
        "{}: {} 个组, {} 个单元, 积分方法 {}",
        pbm.name(),
        pbm.n_groups(),
        fluid.n_cells(),
        method.name()
    );

    let continuous = case.population_balance.continuous_phase.clone();
    let dispersed: Vec<String> = pbm.phase_names().to_vec();
    let dispersed_refs: Vec<&str> = dispersed.iter().map(String::as_str).collect();

    let output = case.output.directory.clone();
    std::fs::create_dir_all(&output)
        .with_context(|| format!("创建输出目录失败: {}", output.display()))?;
    write_snapshot(&pbm, &output, fluid.time())?;

    let start = Instant::now();
    let initial_volume = pbm.dispersed_volume(&fluid)?;
    let mut last_output = fluid.time();
    let mut steps = 0usize;
    let mut outputs = 1usize;
    let end = case.end_time - 1e-9 * case.delta_t;

    info!("开始推进: 结束时间={} s, 时间步长={} s", case.end_time, case.delta_t);

    while fluid.time() < end {
        fluid.advance_time();
        steps += 1;

        for iter in 0..case.outer_correctors {
            fluid.set_final_iteration(iter + 1 == case.outer_correctors);
            let stats = pbm.solve(&fluid, &solver)?;
            debug!(
                "外迭代 {}: 刷新={}, 校正 {} 次, 残差 {:.3e}",
                iter, stats.refreshed, stats.correctors, stats.residual
            );
        }

        let sources: HashMap<String, ScalarField> = dispersed
            .iter()
            .map(|name| (name.clone(), pbm.net_mass_transfer_into(name)))
            .collect();
        fluid.update_dispersed_alpha(&continuous, &dispersed_refs, &sources)?;
        pbm.correct(&fluid)?;

        let volumes = fluid.cell_volumes();
        let d32: Vec<String> = dispersed
            .iter()
            .map(|name| {
                pbm.d32(name)
                    .map(|d| format!("{}={:.4e}", name, d.weighted_average(volumes)))
            })
            .collect::<Result<_, _>>()?;
        let volume = pbm.dispersed_volume(&fluid)?;
        let drift = if initial_volume > 0.0 {
            (volume - initial_volume) / initial_volume
        } else {
            0.0
        };
        info!(
            "t={:.4e} s: d32 [{}], dsm={:.4e} m, 分散相体积变化 {:+.3e}",
            fluid.time(),
            d32.join(", "),
            pbm.dsm().weighted_average(volumes),
            drift
        );

        if fluid.time() - last_output >= case.output.interval - 1e-9 * case.delta_t {
            write_snapshot(&pbm, &output, fluid.time())?;
            last_output = fluid.time();
            outputs += 1;
        }
    }

    info!("=== 计算完成 ===");
    info!("总步数: {}", steps);
    info!("计算时间: {:.2} s", start.elapsed().as_secs_f64());
    info!("输出次数: {}", outputs);

    Ok(())
}

/// 写出一个时间目录
fn write_snapshot(pbm: &PopulationBalanceModel, output: &Path, time: f64) -> Result<()> {
    let dir = output.join(format!("{:.6}", time));
    let files = pbm
        .write_fields(&dir, time)
        .with_context(|| format!("写出组分数场失败: {}", dir.display()))?;
    debug!("t={}: 写出 {} 个文件到 {}", time, files.len(), dir.display());
    Ok(())
}
