// Command handlers
use crate::application::chart_service::{ChartModel, ChartService};
use crate::application::refresh_service::RefreshService;
use crate::domain::dashboard::{ChartPreset, DateRange, GraphConfig, PresetUpdate};
use crate::application::dashboard_service::DashboardService;
use crate::infrastructure::csv_export::to_csv;
use crate::infrastructure::export::{default_file_name, write_export};
use crate::infrastructure::model_mapper::to_view;
use crate::infrastructure::svg_render::render_svg;
use crate::presentation::app_state::AppState;
use crate::presentation::cli::{
    ChartTypeArg, Command, DevicesArgs, OutputFormat, PresetCommand, RenderArgs, SelectionArgs,
    WatchArgs,
};
use anyhow::Context;
use chrono::{DateTime, Utc};
use futures::{pin_mut, StreamExt};
use std::path::{Path, PathBuf};
use tokio::sync::watch;

pub async fn handle(state: &AppState, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Render(args) => render(state, args).await,
        Command::Devices(args) => list_devices(state, args).await,
        Command::Presets { command } => presets(state, command).await,
        Command::Watch(args) => watch_chart(state, args).await,
        Command::Config { .. } => anyhow::bail!("config commands run before settings are loaded"),
    }
}

fn date_range(selection: &SelectionArgs, now: DateTime<Utc>) -> anyhow::Result<DateRange> {
    let range = match (selection.start, selection.end) {
        (Some(start), Some(end)) => DateRange::new(start, end),
        _ => {
            if selection.days <= 0 {
                anyhow::bail!("--days must be positive, got {}", selection.days);
            }
            DateRange::last_days(now, selection.days)
                .with_context(|| format!("--days {} is out of range", selection.days))?
        }
    };
    if !range.is_valid() {
        anyhow::bail!("Range start {} is after end {}", range.start, range.end);
    }
    Ok(range)
}

async fn graph_from_selection(
    state: &AppState,
    selection: &SelectionArgs,
    range: DateRange,
) -> anyhow::Result<GraphConfig> {
    let mut graph = GraphConfig::new("graph-1", "Graph 1");
    graph.selected_devices = if selection.devices.is_empty() {
        let devices = state.source.list_devices().await?;
        DashboardService::default_devices(&devices)
    } else {
        selection.devices.clone()
    };
    if !selection.metrics.is_empty() {
        graph.selected_metrics = selection.metrics.clone();
    }
    graph.date_range = Some(range);
    graph.chart_height = Some(state.settings.chart_height);
    graph.chart_config.tick_count = state.settings.tick_count;
    Ok(graph)
}

fn apply_overrides(chart: &mut ChartService, args: &RenderArgs) -> anyhow::Result<()> {
    if let Some(chart_type) = args.chart_type {
        chart.set_chart_type(chart_type.into());
    }
    if args.normalize {
        chart.set_normalize(true);
    }
    if let Some(title) = &args.title {
        chart.set_title(title.clone());
    }
    if let Some(ticks) = args.ticks {
        chart.set_tick_count(ticks)?;
    }
    if args.x_ticks.is_some() {
        chart.set_x_ticks(args.x_ticks)?;
    }
    if let Some(height) = args.height {
        chart.set_chart_height(height)?;
    }
    if args.no_grid {
        chart.set_show_grid(false);
    }
    if args.no_legend {
        chart.set_show_legend(false);
    }
    for key in &args.hide {
        chart.toggle_visibility(key)?;
    }
    for (key, color) in &args.colors {
        chart.set_color(key, color)?;
    }
    for (key, opacity) in &args.opacities {
        let opacity: f64 = opacity
            .parse()
            .with_context(|| format!("Invalid opacity '{}' for {}", opacity, key))?;
        chart.set_opacity(key, opacity)?;
    }
    for (metric, axis) in &args.y_axes {
        chart.set_axis_override(metric.clone(), *axis)?;
    }
    Ok(())
}

fn export_target(output: Option<&Path>, fallback_dir: PathBuf, name: String) -> (PathBuf, String) {
    match output {
        Some(path) if path.is_dir() => (path.to_path_buf(), name),
        Some(path) => {
            let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
            let file = path
                .file_name()
                .map(|f| f.to_string_lossy().into_owned())
                .unwrap_or(name);
            (dir, file)
        }
        None => (fallback_dir, name),
    }
}

async fn render(state: &AppState, args: RenderArgs) -> anyhow::Result<()> {
    let now = Utc::now();
    let width = args.width.unwrap_or(state.settings.viewport_width);

    let mut charts: Vec<(String, ChartService)> = Vec::new();
    if let Some(id) = &args.preset {
        let preset = state
            .presets
            .get(id)
            .with_context(|| format!("Preset not found: {}", id))?;
        let dashboard = state.dashboard_service.restore_preset(&preset).await?;
        for graph in state.dashboard_service.render_dashboard(&dashboard).await {
            charts.push((graph.graph_id, graph.chart));
        }
    } else {
        let range = date_range(&args.selection, now)?;
        let graph = graph_from_selection(state, &args.selection, range).await?;
        let mut chart = state.dashboard_service.chart_for_graph(&graph, range).await?;
        apply_overrides(&mut chart, &args)?;
        charts.push((graph.id, chart));
    }

    let models: Vec<(String, ChartModel)> = charts
        .into_iter()
        .map(|(id, mut chart)| {
            chart.set_viewport(width);
            (id, chart.recompute())
        })
        .collect();

    if models.iter().all(|(_, m)| m.is_empty()) {
        println!("No data for the current selection");
        return Ok(());
    }

    if args.format == OutputFormat::Json {
        let views: Vec<_> = models.iter().map(|(_, m)| to_view(m)).collect();
        let body = if views.len() == 1 {
            serde_json::to_string_pretty(&views[0])?
        } else {
            serde_json::to_string_pretty(&views)?
        };
        match &args.output {
            Some(path) => {
                let (dir, file) = export_target(Some(path), PathBuf::new(), default_file_name(now, "json"));
                write_export(&dir, &file, &body)?;
            }
            None => println!("{}", body),
        }
        return Ok(());
    }

    let extension = match args.format {
        OutputFormat::Csv => "csv",
        _ => "svg",
    };
    let single = models.len() == 1;
    for (graph_id, model) in &models {
        if model.is_empty() {
            tracing::warn!("Skipping export of empty graph {}", graph_id);
            continue;
        }
        let body = match args.format {
            OutputFormat::Csv => to_csv(model)?,
            _ => render_svg(model, width)?,
        };
        let name = if single {
            default_file_name(now, extension)
        } else {
            default_file_name(now, &format!("{}.{}", graph_id, extension))
        };
        let output = if single { args.output.as_deref() } else { args.output.as_deref().filter(|p| p.is_dir()) };
        let (dir, file) = export_target(output, state.settings.storage_dir().join("exports"), name);
        let path = write_export(&dir, &file, &body)?;
        println!("{}", path.display());
    }
    Ok(())
}

async fn list_devices(state: &AppState, args: DevicesArgs) -> anyhow::Result<()> {
    let devices = state.source.list_devices().await?;
    for device in devices
        .iter()
        .filter(|d| args.device_type.is_none_or(|t| d.device_type == t))
        .filter(|d| !args.online_only || d.is_online())
    {
        println!(
            "{:<32} {:<36} {:<14} {:<8} {}F {}",
            device.id,
            device.name,
            device.device_type.as_str(),
            format!("{:?}", device.status).to_lowercase(),
            device.location.floor,
            device.location.area
        );
    }
    Ok(())
}

async fn presets(state: &AppState, command: PresetCommand) -> anyhow::Result<()> {
    match command {
        PresetCommand::List => {
            for preset in state.presets.list() {
                println!(
                    "{}  {}  ({} graphs, updated {})",
                    preset.id,
                    preset.name,
                    preset.graphs.len(),
                    preset.updated_at.format("%Y-%m-%d %H:%M")
                );
            }
        }
        PresetCommand::Show { id } => {
            let preset = state
                .presets
                .get(&id)
                .with_context(|| format!("Preset not found: {}", id))?;
            println!("{}", serde_json::to_string_pretty(&preset)?);
        }
        PresetCommand::Save {
            name,
            selection,
            normalize,
            chart_type,
        } => {
            let range = date_range(&selection, Utc::now())?;
            let mut graph = graph_from_selection(state, &selection, range).await?;
            graph.chart_config.normalize = normalize;
            graph.chart_config.chart_type = chart_type.unwrap_or(ChartTypeArg::Line).into();

            let preset = ChartPreset::new(name, range, vec![graph]);
            state.presets.save(&preset)?;
            println!("{}", preset.id);
        }
        PresetCommand::Delete { id } => {
            state.presets.delete(&id)?;
        }
        PresetCommand::Rename { id, name } => {
            let preset = state.presets.update(
                &id,
                PresetUpdate {
                    name: Some(name),
                    ..PresetUpdate::default()
                },
            )?;
            println!("{}  {}", preset.id, preset.name);
        }
    }
    Ok(())
}

async fn watch_chart(state: &AppState, args: WatchArgs) -> anyhow::Result<()> {
    let range = date_range(&args.selection, Utc::now())?;
    let graph = graph_from_selection(state, &args.selection, range).await?;
    let chart = state.dashboard_service.chart_for_graph(&graph, range).await?;

    let interval = args.interval.unwrap_or(state.settings.refresh_interval_secs);
    let refresh = RefreshService::new(state.source.clone(), interval)?.with_window(range.end - range.start);

    let (stop_tx, stop_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = stop_tx.send(true);
        }
    });

    tracing::info!("Refreshing every {}s, Ctrl-C to stop", interval);
    let ticks = refresh.run(chart, stop_rx);
    pin_mut!(ticks);

    while let Some(tick) = ticks.next().await {
        let latest: Vec<String> = tick
            .model
            .visible_series()
            .filter_map(|d| {
                tick.model
                    .rows
                    .iter()
                    .rev()
                    .find_map(|r| r.cells.get(&d.key))
                    .map(|c| format!("{}={:.1}{}", d.key, c.original.unwrap_or(c.value), d.unit))
            })
            .collect();
        println!(
            "[{}] tick {}: {} rows, {}",
            tick.at.format("%H:%M:%S"),
            tick.tick,
            tick.model.rows.len(),
            latest.join(" ")
        );

        if args.count.is_some_and(|limit| tick.tick >= limit) {
            break;
        }
    }
    Ok(())
}
