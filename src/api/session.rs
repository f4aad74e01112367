//! Line-oriented JSON command session over a scene.
//!
//! Each request is one line `{"command": "...", "params": {...}}`; each
//! response is one line `{"status": "success", "data": ...}` or
//! `{"status": "error", "message": "..."}`.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::api::dto::SceneDto;
use crate::application::Scene;
use crate::domain::scaler::{Scaler, MAX_SCALE};

#[derive(Debug, Deserialize)]
struct CommandReq {
    command: String,
    params: Option<Value>,
}

/// What the session loop should do after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Shutdown,
}

/// Serve commands from `reader` until EOF or `SHUTDOWN`.
pub fn run_session<R: BufRead, W: Write>(scene: &mut Scene, mut reader: R, mut writer: W) -> Result<()> {
    let mut line = String::new();
    loop {
        line.clear();
        let bytes_read = reader.read_line(&mut line).context("Failed to read command")?;
        if bytes_read == 0 {
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let (response, flow) = match process_command(scene, trimmed) {
            Ok((data, flow)) => (json!({ "status": "success", "data": data }), flow),
            Err(e) => {
                warn!("command failed: {:#}", e);
                (
                    json!({ "status": "error", "message": format!("{:#}", e) }),
                    Flow::Continue,
                )
            }
        };

        let response_str = serde_json::to_string(&response)?;
        writer.write_all(response_str.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        if flow == Flow::Shutdown {
            info!("session shutdown requested");
            break;
        }
    }
    Ok(())
}

fn process_command(scene: &mut Scene, json_str: &str) -> Result<(Value, Flow)> {
    let req: CommandReq = serde_json::from_str(json_str).context("Invalid JSON format")?;
    debug!("command {}", req.command);
    let params = req.params.unwrap_or(Value::Null);

    let data = match req.command.as_str() {
        "PING" => json!("PONG"),
        "CLICK" => {
            let x = int_param(&params, "x")?;
            let y = int_param(&params, "y")?;
            match scene.click(x, y) {
                Some(id) => json!({
                    "id": id.index(),
                    "kind": scene.tree.kind(id).label(),
                    "name": scene.tree.kind(id).name(),
                }),
                None => Value::Null,
            }
        }
        "DESELECT" => {
            scene.deselect();
            Value::Null
        }
        "MOVE" => {
            let dx = int_param(&params, "dx")?;
            let dy = int_param(&params, "dy")?;
            scene.move_by(dx, dy)?;
            Value::Null
        }
        "SCALE" => {
            let factor = params
                .get("factor")
                .and_then(Value::as_f64)
                .ok_or_else(|| anyhow::anyhow!("Missing 'factor' param"))?;
            if factor.is_nan() || factor <= 0.0 {
                anyhow::bail!("'factor' must be positive");
            }
            let target = scene.scaler().rescale(factor).scale;
            if !Scaler::is_valid_scale(target) {
                anyhow::bail!("scale {} is outside (0, {}]", target, MAX_SCALE);
            }
            scene.rescale(factor);
            scene.refresh();
            json!({ "scale": scene.scaler().scale })
        }
        "RESIZE" => {
            let width = int_param(&params, "width")?;
            let height = int_param(&params, "height")?;
            scene.resize(width, height);
            Value::Null
        }
        "SCENE" => serde_json::to_value(SceneDto::from(&*scene))?,
        "EXPORT" => {
            let path = params
                .get("path")
                .and_then(Value::as_str)
                .ok_or_else(|| anyhow::anyhow!("Missing 'path' param"))?;
            scene.export_svg(path)?;
            json!({ "path": path })
        }
        "SHUTDOWN" => return Ok((json!("Shutting down..."), Flow::Shutdown)),
        _ => anyhow::bail!("Unknown command: {}", req.command),
    };
    Ok((data, Flow::Continue))
}

fn int_param(params: &Value, key: &str) -> Result<i32> {
    let value = params
        .get(key)
        .and_then(Value::as_i64)
        .ok_or_else(|| anyhow::anyhow!("Missing '{}' param", key))?;
    i32::try_from(value).with_context(|| format!("'{}' is out of range", key))
}
