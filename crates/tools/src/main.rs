use std::env;
use std::fs;

use drilldown::{Command, DrilldownConfig, DrilldownController};
use foundation::{GeoLevel, LonLat, RegionId};
use formats::BoundaryCollection;
use layers::triangulate_feature;
use tools::{DirProvider, pump};

fn main() {
    if let Err(e) = real_main() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn real_main() -> Result<(), String> {
    let mut args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        return Err(usage());
    }

    let cmd = args[1].clone();
    args.drain(0..2);

    match cmd.as_str() {
        "inspect" => cmd_inspect(args),
        "replay" => cmd_replay(args),
        _ => Err(usage()),
    }
}

fn usage() -> String {
    "usage:\n  \
     atlas inspect <boundaries.geojson>\n  \
     atlas replay <fixture_dir> [--country ID]"
        .to_string()
}

/// Decode a boundary file and print what the drill-down would see.
fn cmd_inspect(args: Vec<String>) -> Result<(), String> {
    let Some(path) = args.first() else {
        return Err(usage());
    };

    let payload = fs::read_to_string(path).map_err(|e| format!("read {path}: {e}"))?;
    let collection =
        BoundaryCollection::from_geojson_str(&payload).map_err(|e| format!("decode: {e}"))?;

    println!(
        "{}: {} feature(s), {} skipped, ~{} bytes, hash {}",
        path,
        collection.len(),
        collection.skipped,
        collection.approx_size_bytes(),
        &collection.content_hash()[..12],
    );
    for (idx, feature) in collection.features.iter().enumerate() {
        let triangles = triangulate_feature(feature).len() / 3;
        println!(
            "  [{idx}] id={} name={} zone={} polygons={} triangles={} center=({:.2}, {:.2})",
            feature.id.as_deref().unwrap_or("-"),
            feature.name.as_deref().unwrap_or("-"),
            feature.zone.map(|z| z.code()).unwrap_or("-"),
            feature.polygons.len(),
            triangles,
            feature.bounds.center().lon_deg,
            feature.bounds.center().lat_deg,
        );
    }
    Ok(())
}

/// Replay a scripted drill against fixture files and print each decision.
fn cmd_replay(args: Vec<String>) -> Result<(), String> {
    let Some(dir) = args.first().cloned() else {
        return Err(usage());
    };

    let mut country = "IN".to_string();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--country" => {
                i += 1;
                country = args
                    .get(i)
                    .cloned()
                    .ok_or_else(|| "--country requires a value".to_string())?;
            }
            s => return Err(format!("unknown arg: {s}\n\n{}", usage())),
        }
        i += 1;
    }

    let provider = DirProvider::new(&dir);
    let mut ctrl = DrilldownController::new(DrilldownConfig {
        initial_level: GeoLevel::Mandal,
        ..DrilldownConfig::default()
    });

    ctrl.apply(Command::SetCountry(RegionId::new(&country)));
    pump(&mut ctrl, &provider);
    report(&mut ctrl, "boot");

    if ctrl.fallback_active() {
        // Degraded mode: the panel is all we can drive.
        ctrl.apply(Command::ClickFallbackAt {
            x_frac: 0.48,
            y_frac: 0.18,
        });
        report(&mut ctrl, "fallback zone pick");
        return Ok(());
    }

    // Walk down the hierarchy by clicking the first feature of each layer.
    for level in GeoLevel::boundary_levels() {
        let Some(point) = first_feature_center(&ctrl, level) else {
            println!("-- no {level} features to click, stopping");
            break;
        };
        ctrl.apply(Command::ClickAt(point));
        pump(&mut ctrl, &provider);
        report(&mut ctrl, &format!("click {level}"));
    }

    ctrl.apply(Command::Reset);
    pump(&mut ctrl, &provider);
    report(&mut ctrl, "reset");
    Ok(())
}

fn first_feature_center(ctrl: &DrilldownController, level: GeoLevel) -> Option<LonLat> {
    let layer = ctrl.stack().get(level)?;
    let bound = layer.features().first()?;
    Some(bound.feature.bounds.center())
}

fn report(ctrl: &mut DrilldownController, label: &str) {
    println!("-- {label}");
    for event in ctrl.drain_events() {
        println!("   [{:>4}] {:?}", event.frame_index, event.payload);
    }
    let s = ctrl.selection();
    println!(
        "   selection: state={} district={} mandal={} zone={} zoom={:.2}",
        s.state().map(|r| r.as_str()).unwrap_or("-"),
        s.district().map(|r| r.as_str()).unwrap_or("-"),
        s.mandal().map(|r| r.as_str()).unwrap_or("-"),
        s.zone().map(|z| z.code()).unwrap_or("-"),
        ctrl.view().zoom,
    );
}
