use clap::{AppSettings, Parser};
use log::info;

use ddplan::{error::PlanError, plan::Plan, smear, SearchSetup};

/// Calculate a dedispersion plan for a given observational setup.
#[derive(Parser)]
#[clap(global_setting(AppSettings::DeriveDisplayOrder))]
#[clap(disable_help_subcommand = true)]
#[clap(infer_long_args = true)]
struct Args {
    /// The lower edge of the observing band, in MHz.
    #[clap(long)]
    f0: f64,

    /// The upper edge of the observing band, in MHz.
    #[clap(long)]
    f1: f64,

    /// The sampling time, in ms.
    #[clap(long)]
    dt: f64,

    /// The fine-channel width, in MHz.
    #[clap(long)]
    df: f64,

    /// The highest DM to search.
    #[clap(long)]
    dm_max: f64,

    /// The lowest DM to search.
    #[clap(long, default_value_t = 0.0)]
    dm_min: f64,

    /// The number of subbands. If unset, one subband per full channel.
    #[clap(long)]
    nsub: Option<usize>,

    /// The number of DM grid samples the trial-spacing optimizer runs
    /// over.
    #[clap(long, default_value_t = 1000)]
    dm_samples: usize,

    /// Start a new plan segment once the trials-per-unit-DM density has
    /// dropped by this many decades.
    #[clap(long, default_value_t = 0.5)]
    step: f64,

    /// The reference trial spacing used for the diagnostic smearing
    /// table.
    #[clap(long, default_value_t = 0.5)]
    ddm: f64,

    /// Also print the per-DM smearing diagnostics (all times in ms).
    #[clap(long)]
    diagnostics: bool,

    /// The verbosity of the program. Increase by specifying multiple times
    /// (e.g. -vv). The default is to print only high-level information.
    #[clap(short, long, parse(from_occurrences))]
    verbosity: u8,
}

fn main() {
    if let Err(e) = try_main() {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

fn try_main() -> Result<(), PlanError> {
    let args = Args::parse();
    setup_logging(args.verbosity);

    let nsub = args
        .nsub
        .unwrap_or_else(|| ((args.f1 - args.f0) / args.df).floor() as usize);
    let setup = SearchSetup::new(
        args.f0,
        args.f1,
        args.df,
        args.dt,
        nsub,
        args.dm_min,
        args.dm_max,
    )?;
    info!(
        "Band {}-{} MHz ({} full channels of {} MHz, {} subbands), dt {} ms",
        setup.f_low_mhz,
        setup.f_high_mhz,
        setup.num_channels(),
        setup.freq_res_mhz,
        setup.num_subbands,
        setup.time_res_ms
    );

    let plan = Plan::compute(&setup, args.dm_samples, args.step)?;
    print!("{plan}");

    if args.diagnostics {
        let dms = ddplan::plan::dm_grid(setup.dm_min, setup.dm_max, args.dm_samples);
        let curves = smear::smearing_curves(&setup, &dms, args.ddm);

        println!();
        println!(
            "{:>10} | {:>10} | {:>10} | {:>10} | {:>10} | {:>10}",
            "DM", "Channel", "BW Step", "Subband", "Total", "Scattering"
        );
        for i in 0..dms.len() {
            println!(
                "{:>10.3} | {:>10.4} | {:>10.4} | {:>10.4} | {:>10.4} | {:>10.4}",
                curves.dms[i],
                curves.channel_ms[i],
                curves.bandwidth_ms[i],
                curves.subband_ms[i],
                curves.total_with_scattering_ms[i],
                curves.scattering_ms[i]
            );
        }
    }

    Ok(())
}

fn setup_logging(verbosity: u8) {
    let mut builder = env_logger::Builder::from_default_env();
    builder.target(env_logger::Target::Stdout);
    builder.format_target(false);
    match verbosity {
        0 => builder.filter_level(log::LevelFilter::Info),
        1 => builder.filter_level(log::LevelFilter::Debug),
        _ => builder.filter_level(log::LevelFilter::Trace),
    };
    builder.init();
}
