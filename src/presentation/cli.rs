// Command line definitions
use crate::domain::chart::{AxisOverride, ChartType};
use crate::domain::device::DeviceType;
use crate::domain::metric::MetricCode;
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(version, about = "Multi-series energy and IoT chart engine")]
pub struct Cli {
    /// Configuration file (without extension)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compute a chart and export it
    Render(RenderArgs),
    /// List devices of the configured facility
    Devices(DevicesArgs),
    /// Manage saved dashboard presets
    Presets {
        #[command(subcommand)]
        command: PresetCommand,
    },
    /// Refresh a chart with realtime samples
    Watch(WatchArgs),
    /// Configuration helpers
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Csv,
    Svg,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ChartTypeArg {
    Line,
    Bar,
    Area,
}

impl From<ChartTypeArg> for ChartType {
    fn from(arg: ChartTypeArg) -> Self {
        match arg {
            ChartTypeArg::Line => ChartType::Line,
            ChartTypeArg::Bar => ChartType::Bar,
            ChartTypeArg::Area => ChartType::Area,
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct SelectionArgs {
    /// Device ids; defaults to one environmental, power and hvac device
    #[arg(long, value_delimiter = ',')]
    pub devices: Vec<String>,

    /// Metric codes, e.g. temperature,co2
    #[arg(long, value_delimiter = ',', value_parser = parse_metric)]
    pub metrics: Vec<MetricCode>,

    /// Range length ending now, in days
    #[arg(long, default_value_t = 1)]
    pub days: i64,

    /// Range start (RFC 3339); overrides --days together with --end
    #[arg(long, requires = "end")]
    pub start: Option<DateTime<Utc>>,

    #[arg(long, requires = "start")]
    pub end: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Args)]
pub struct RenderArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Render every graph of a saved preset instead of a selection
    #[arg(long, conflicts_with_all = ["devices", "metrics"])]
    pub preset: Option<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    #[arg(long, value_enum)]
    pub chart_type: Option<ChartTypeArg>,

    #[arg(long)]
    pub normalize: bool,

    #[arg(long)]
    pub title: Option<String>,

    /// Common Y tick count (2-10)
    #[arg(long)]
    pub ticks: Option<usize>,

    /// Target number of X labels
    #[arg(long)]
    pub x_ticks: Option<usize>,

    /// Series keys to hide, e.g. office-power-004_power
    #[arg(long, value_delimiter = ',')]
    pub hide: Vec<String>,

    /// Series colors as key=#rrggbb
    #[arg(long = "color", value_parser = parse_key_value)]
    pub colors: Vec<(String, String)>,

    /// Series opacity as key=0.5
    #[arg(long = "opacity", value_parser = parse_key_value)]
    pub opacities: Vec<(String, String)>,

    /// Y axis override as metric=min:max[:ticks]; either bound may be empty
    #[arg(long = "y-axis", value_parser = parse_axis_override)]
    pub y_axes: Vec<(MetricCode, AxisOverride)>,

    #[arg(long)]
    pub width: Option<u32>,

    #[arg(long)]
    pub height: Option<u32>,

    #[arg(long)]
    pub no_grid: bool,

    #[arg(long)]
    pub no_legend: bool,

    /// Output file or directory; JSON goes to stdout when omitted
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
pub struct DevicesArgs {
    #[arg(long = "type", value_parser = parse_device_type)]
    pub device_type: Option<DeviceType>,

    #[arg(long)]
    pub online_only: bool,
}

#[derive(Debug, Subcommand)]
pub enum PresetCommand {
    List,
    Show {
        id: String,
    },
    /// Save the selection as a one-graph preset
    Save {
        #[arg(long)]
        name: String,
        #[command(flatten)]
        selection: SelectionArgs,
        #[arg(long)]
        normalize: bool,
        #[arg(long, value_enum)]
        chart_type: Option<ChartTypeArg>,
    },
    Delete {
        id: String,
    },
    Rename {
        id: String,
        name: String,
    },
}

#[derive(Debug, Clone, Args)]
pub struct WatchArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Seconds between refreshes (1-60); defaults to the configured interval
    #[arg(long)]
    pub interval: Option<u64>,

    /// Stop after this many refreshes; runs until Ctrl-C when omitted
    #[arg(long)]
    pub count: Option<u64>,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Write the default configuration file
    Init {
        #[arg(long, default_value = "config/dashboard")]
        path: PathBuf,
    },
}

fn parse_metric(s: &str) -> Result<MetricCode, String> {
    let metric = MetricCode::from(s.trim());
    if metric.is_known() {
        Ok(metric)
    } else {
        Err(format!("unknown metric '{}'", s))
    }
}

fn parse_device_type(s: &str) -> Result<DeviceType, String> {
    DeviceType::ALL
        .into_iter()
        .find(|t| t.as_str() == s)
        .ok_or_else(|| format!("unknown device type '{}'", s))
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", s))?;
    if key.is_empty() {
        return Err(format!("missing key in '{}'", s));
    }
    Ok((key.to_string(), value.to_string()))
}

fn parse_bound(s: &str) -> Result<Option<f64>, String> {
    if s.is_empty() {
        return Ok(None);
    }
    s.parse::<f64>()
        .map(Some)
        .map_err(|e| format!("invalid bound '{}': {}", s, e))
}

fn parse_axis_override(s: &str) -> Result<(MetricCode, AxisOverride), String> {
    let (metric, spec) = parse_key_value(s)?;
    let parts: Vec<&str> = spec.split(':').collect();
    if parts.len() < 2 || parts.len() > 3 {
        return Err(format!("expected metric=min:max[:ticks], got '{}'", s));
    }
    let ticks = match parts.get(2) {
        Some(t) if !t.is_empty() => Some(
            t.parse::<usize>()
                .map_err(|e| format!("invalid tick count '{}': {}", t, e))?,
        ),
        _ => None,
    };
    Ok((
        MetricCode::from(metric),
        AxisOverride {
            min: parse_bound(parts[0])?,
            max: parse_bound(parts[1])?,
            ticks,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_axis_override() {
        let (metric, axis) = parse_axis_override("power=0:200:6").unwrap();
        assert_eq!(metric, MetricCode::Power);
        assert_eq!(axis, AxisOverride { min: Some(0.0), max: Some(200.0), ticks: Some(6) });

        let (_, open) = parse_axis_override("co2=:1500").unwrap();
        assert_eq!(open.min, None);
        assert_eq!(open.max, Some(1500.0));

        assert!(parse_axis_override("co2").is_err());
        assert!(parse_axis_override("co2=a:b").is_err());
    }

    #[test]
    fn test_render_command_line() {
        let cli = Cli::try_parse_from([
            "energy-dashboard",
            "render",
            "--devices",
            "office-environmental-001,office-power-004",
            "--metrics",
            "temperature,power",
            "--format",
            "csv",
            "--chart-type",
            "bar",
            "--color",
            "office-power-004_power=#112233",
        ])
        .unwrap();

        let Command::Render(args) = cli.command else {
            panic!("expected render");
        };
        assert_eq!(args.selection.devices.len(), 2);
        assert_eq!(args.selection.metrics, vec![MetricCode::Temperature, MetricCode::Power]);
        assert_eq!(args.format, OutputFormat::Csv);
        assert_eq!(args.chart_type, Some(ChartTypeArg::Bar));
        assert_eq!(args.colors[0].1, "#112233");
    }

    #[test]
    fn test_unknown_metric_is_rejected() {
        assert!(Cli::try_parse_from(["energy-dashboard", "render", "--metrics", "radon"]).is_err());
    }
}
