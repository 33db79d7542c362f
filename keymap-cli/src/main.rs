mod simulate;

use std::env;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use keymap_config::convert::{
    LAYOUT_NAME, count_layers, default_layout_map, generate_vial, generate_vitaly_layout, postprocess_qmk_keymap,
    qmk_keymap_from_vitaly, run_output, vitaly_to_qmk,
};
use keymap_config::json::{read_json, to_pretty_json, write_json_atomic};
use keymap_config::keycode_alias::{keycode_name, parse_keycode_expr};
use keymap_config::keycodes::{generate_keycodes, keycodes_by_value, safe_range_start};
use keymap_config::keymap_c::{key_to_layer, parse_custom_keycodes, parse_notifier_keys};
use keymap_config::types::{CustomKeycodesJson, KeyboardJson, KeycodesJson, QmkKeycodesSpec, QmkKeymapJson, VitalyJson};
use keymap_config::ProjectContext;
use keymap_core::keyboards::BuiltinKeyboard;
use keymap_core::keycode_convert::from_qmk_keycode;
use log::{debug, info, warn};
use serde_json::Value;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory containing keyboard configurations
    #[arg(short, long, global = true, default_value = "keyboards")]
    keyboards_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show information about a keyboard
    Info {
        #[arg(short = 'i', long)]
        keyboard_id: String,
        /// Print the merged keyboard.toml instead
        #[arg(long)]
        resolved: bool,
    },
    /// Compile the firmware for a keyboard
    Compile {
        #[arg(short = 'i', long)]
        keyboard_id: String,
    },
    /// Generate keycodes.json from a QMK keycode spec
    GenerateKeycodes {
        /// Merged QMK keycode spec (`keycodes` table of hex code to key and aliases)
        #[arg(long)]
        spec: PathBuf,
        /// Output path, stdout if omitted
        #[arg(long)]
        keycodes_json: Option<PathBuf>,
    },
    /// Number the custom keycodes of keymap.c from SAFE_RANGE
    CustomKeycodes {
        keymap_c: PathBuf,
        /// keycodes.json to read SAFE_RANGE from
        #[arg(long)]
        keycodes_json: PathBuf,
        /// Output path, stdout if omitted
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Map the layer notifier keys of keymap.c to layer names
    KeyToLayer {
        #[arg(long)]
        keymap_c: PathBuf,
        /// Prefix for layer names
        #[arg(long, default_value = "")]
        prefix: String,
    },
    /// Convert a Vitaly dump to QMK keymap JSON, keycodes are named through keycodes.json
    VitalyToQmk {
        #[arg(long)]
        vitaly_json: PathBuf,
        #[arg(long)]
        keycodes_json: PathBuf,
        /// keyboard.json to map the matrix to the flattened layout
        #[arg(long)]
        keyboard_json: Option<PathBuf>,
    },
    /// Convert a Vitaly dump to QMK keymap JSON through the LAYOUT macro of keyboard.json
    QmkFromVitaly {
        #[arg(long)]
        vitaly_json: PathBuf,
        #[arg(long)]
        keyboard_json: PathBuf,
    },
    /// Apply custom keycode names and resolve transparent keys of a QMK keymap
    Postprocess {
        qmk_keymap_json: PathBuf,
        #[arg(long)]
        custom_keycodes_json: PathBuf,
    },
    /// Write the layers of a QMK keymap back into a Vitaly dump
    VitalyLayout {
        #[arg(long)]
        qmk_keymap_json: PathBuf,
        /// Base Vitaly JSON, other fields are kept
        #[arg(long)]
        vitaly_json: PathBuf,
        #[arg(long)]
        keyboard_json: PathBuf,
        #[arg(long)]
        custom_keycodes_json: PathBuf,
        #[arg(long, default_value = LAYOUT_NAME)]
        layout_name: String,
        /// Output path, stdout if omitted
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Generate the Vial definition of a keyboard.json
    Vial {
        #[arg(long)]
        keyboard_json: PathBuf,
        #[arg(long, default_value = LAYOUT_NAME)]
        layout_name: String,
        /// Output path, stdout if omitted
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print the number of layers of a QMK keymap
    CountLayers { qmk_keymap_json: PathBuf },
    /// Run a command and atomically write its stdout to the output path
    RunOutput {
        output: PathBuf,
        /// Command to run, use -- before it
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },
    /// Evaluate a keycode expression such as `LT(1, KC_SPC)`
    Keycode { expr: String },
    /// Replay a key event script through the built-in keymap of a keyboard
    Simulate {
        #[arg(short = 'i', long)]
        keyboard_id: String,
        /// Script file, stdin if omitted
        #[arg(long)]
        script: Option<PathBuf>,
    },
}

/// Pretty JSON to `output`, or stdout
fn emit_json<T: serde::Serialize + ?Sized>(value: &T, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            write_json_atomic(path, value)?;
            info!("Wrote {}", path.display());
        }
        None => println!("{}", to_pretty_json(value)?),
    }
    Ok(())
}

/// `VIAL_KEYBOARD_UID` as written in config.h
fn format_vial_uid(uid: [u8; 8]) -> String {
    uid.iter().map(|b| format!("0x{:02X}", b)).collect::<Vec<_>>().join(", ")
}

fn handle_info(ctx: &ProjectContext, keyboard_id: &str, resolved: bool) -> Result<()> {
    let config = ctx.get_keyboard_config(keyboard_id)?;
    if resolved {
        print!("{}", config.to_toml()?);
        return Ok(());
    }
    println!("Keyboard ID: {}", keyboard_id);
    println!("QMK Keyboard: {}", config.keyboard.qmk_keyboard);
    println!("Keymap: {}", config.keyboard.keymap);
    println!("Layout: {}", config.keyboard.layout);
    println!(
        "Raw HID: report id 0x{:02X}, keyboard id {}",
        config.raw_hid.report_id, config.raw_hid.keyboard_id
    );
    match BuiltinKeyboard::from_id(config.raw_hid.keyboard_id) {
        Some(builtin) => {
            let (rows, cols, layers) = builtin.dimensions();
            println!("Built-in keymap: {:?}, {}x{} matrix, {} layers", builtin, rows, cols, layers);
            println!("Vial UID: {}", format_vial_uid(builtin.vial_uid()));
        }
        None => println!("Built-in keymap: none"),
    }
    println!("Build Directory: {}", ctx.get_build_dir(keyboard_id)?.display());
    Ok(())
}

fn handle_compile(ctx: &ProjectContext, keyboard_id: &str) -> Result<()> {
    let config = ctx.get_keyboard_config(keyboard_id)?;

    info!("Compiling {} ({})...", keyboard_id, config.keyboard.qmk_keyboard);

    let qmk_build_dir = ctx.get_build_dir(keyboard_id)?.join("qmk_build");
    let qmk_build_dir_str = qmk_build_dir
        .to_str()
        .ok_or_else(|| anyhow!("Build directory path contains invalid UTF-8 characters"))?;

    debug!("Executing qmk compile via mise...");
    let status = Command::new("mise")
        .args([
            "exec",
            "--",
            "qmk",
            "compile",
            "-kb",
            &config.keyboard.qmk_keyboard,
            "-km",
            &config.keyboard.keymap,
            "-e",
            &format!("KEYBOARD_ID={}", keyboard_id),
            "-e",
            &format!("BUILD_DIR={}", qmk_build_dir_str),
        ])
        .status()
        .context("Failed to execute qmk compile")?;

    if !status.success() {
        bail!("qmk compile failed with exit code: {:?}", status.code());
    }
    Ok(())
}

fn handle_custom_keycodes(keymap_c: &Path, keycodes_json: &Path, output: Option<&Path>) -> Result<()> {
    let keycodes: KeycodesJson = read_json(keycodes_json)?;
    let safe_range = safe_range_start(&keycodes)?;
    let source =
        fs::read_to_string(keymap_c).with_context(|| format!("Failed to read {}", keymap_c.display()))?;
    let custom_keycodes = parse_custom_keycodes(&source, safe_range)?;
    info!("Found {} custom keycodes in {}", custom_keycodes.len(), keymap_c.display());
    emit_json(&custom_keycodes, output)
}

fn handle_key_to_layer(keymap_c: &Path, prefix: &str) -> Result<()> {
    let source =
        fs::read_to_string(keymap_c).with_context(|| format!("Failed to read {}", keymap_c.display()))?;
    let keys = parse_notifier_keys(&source)?;
    emit_json(&key_to_layer(&keys, prefix)?, None)
}

fn handle_vitaly_to_qmk(vitaly_json: &Path, keycodes_json: &Path, keyboard_json: Option<&Path>) -> Result<()> {
    let raw: Value = read_json(vitaly_json)?;

    let keycodes = match read_json::<KeycodesJson>(keycodes_json) {
        Ok(keycodes) => keycodes_by_value(&keycodes),
        Err(e) => {
            warn!("Failed to load keycodes, numeric keycodes are kept as hex: {}", e);
            Default::default()
        }
    };

    let layout_map = keyboard_json.and_then(|path| match read_json::<KeyboardJson>(path) {
        Ok(keyboard) => default_layout_map(&keyboard),
        Err(e) => {
            warn!("Failed to load layout map, rows are concatenated: {}", e);
            None
        }
    });

    let keymap = vitaly_to_qmk(&raw, &keycodes, layout_map.as_ref())?;
    info!("Converted {} layers from {}", count_layers(&keymap), vitaly_json.display());
    emit_json(&keymap, None)
}

fn handle_postprocess(qmk_keymap_json: &Path, custom_keycodes_json: &Path) -> Result<()> {
    let keymap: QmkKeymapJson = read_json(qmk_keymap_json)?;
    let custom = match read_json::<CustomKeycodesJson>(custom_keycodes_json) {
        Ok(custom) => Some(custom),
        Err(e) => {
            warn!("Failed to load custom keycodes: {}", e);
            None
        }
    };
    emit_json(&postprocess_qmk_keymap(keymap, custom.as_ref()), None)
}

fn handle_keycode(expr: &str) -> Result<()> {
    let code = parse_keycode_expr(expr)?;
    let action = from_qmk_keycode(code);
    let mut result = serde_json::Map::new();
    result.insert("expr".to_string(), Value::from(expr));
    result.insert("code".to_string(), Value::from(format!("0x{:04X}", code)));
    if let Some(name) = keycode_name(code) {
        result.insert("name".to_string(), Value::from(name));
    }
    result.insert("action".to_string(), Value::from(format!("{:?}", action)));
    emit_json(&result, None)
}

fn handle_simulate(ctx: &ProjectContext, keyboard_id: &str, script: Option<&Path>) -> Result<()> {
    let config = ctx.get_keyboard_config(keyboard_id)?;
    let builtin = BuiltinKeyboard::from_id(config.raw_hid.keyboard_id)
        .ok_or_else(|| anyhow!("No built-in keymap for keyboard id {}", config.raw_hid.keyboard_id))?;

    let text = match script {
        Some(path) => fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text).context("Failed to read script from stdin")?;
            text
        }
    };
    let events = simulate::parse_script(&text)?;
    info!("Simulating {} events on {:?}", events.len(), builtin);

    let steps = embassy_futures::block_on(simulate::simulate(builtin, config.layer_report(), &events))?;
    emit_json(&steps, None)
}

fn run(cli: Cli) -> Result<()> {
    let current_dir = env::current_dir()?;
    debug!("Current directory: {:?}", current_dir);

    // Resolve keyboards_dir relative to current_dir if it's relative
    let keyboards_dir = if cli.keyboards_dir.is_relative() {
        current_dir.join(cli.keyboards_dir)
    } else {
        cli.keyboards_dir
    };
    debug!("Keyboards directory: {:?}", keyboards_dir);

    let ctx = ProjectContext::new(current_dir, keyboards_dir);

    match cli.command {
        Commands::Info { keyboard_id, resolved } => {
            info!("showing information for keyboard: {}", keyboard_id);
            handle_info(&ctx, &keyboard_id, resolved)
        }
        Commands::Compile { keyboard_id } => {
            info!("Starting compilation for keyboard: {}", keyboard_id);
            handle_compile(&ctx, &keyboard_id)
        }
        Commands::GenerateKeycodes { spec, keycodes_json } => {
            let spec: QmkKeycodesSpec = read_json(&spec)?;
            let keycodes = generate_keycodes(&spec);
            info!("Generated {} keycodes", keycodes.len());
            emit_json(&keycodes, keycodes_json.as_deref())
        }
        Commands::CustomKeycodes {
            keymap_c,
            keycodes_json,
            output,
        } => handle_custom_keycodes(&keymap_c, &keycodes_json, output.as_deref()),
        Commands::KeyToLayer { keymap_c, prefix } => handle_key_to_layer(&keymap_c, &prefix),
        Commands::VitalyToQmk {
            vitaly_json,
            keycodes_json,
            keyboard_json,
        } => handle_vitaly_to_qmk(&vitaly_json, &keycodes_json, keyboard_json.as_deref()),
        Commands::QmkFromVitaly {
            vitaly_json,
            keyboard_json,
        } => {
            let vitaly: VitalyJson = read_json(&vitaly_json)?;
            let keyboard: KeyboardJson = read_json(&keyboard_json)?;
            emit_json(&qmk_keymap_from_vitaly(&vitaly, &keyboard)?, None)
        }
        Commands::Postprocess {
            qmk_keymap_json,
            custom_keycodes_json,
        } => handle_postprocess(&qmk_keymap_json, &custom_keycodes_json),
        Commands::VitalyLayout {
            qmk_keymap_json,
            vitaly_json,
            keyboard_json,
            custom_keycodes_json,
            layout_name,
            output,
        } => {
            let keymap: QmkKeymapJson = read_json(&qmk_keymap_json)?;
            let vitaly: VitalyJson = read_json(&vitaly_json)?;
            let keyboard: KeyboardJson = read_json(&keyboard_json)?;
            let custom: CustomKeycodesJson = read_json(&custom_keycodes_json)?;
            let updated = generate_vitaly_layout(&keymap, vitaly, &keyboard, &custom, &layout_name)?;
            emit_json(&updated, output.as_deref())
        }
        Commands::Vial {
            keyboard_json,
            layout_name,
            output,
        } => {
            let keyboard: KeyboardJson = read_json(&keyboard_json)?;
            let vial = generate_vial(&keyboard, &layout_name)?;
            info!("Generated Vial JSON from {}", keyboard_json.display());
            emit_json(&vial, output.as_deref())
        }
        Commands::CountLayers { qmk_keymap_json } => {
            let keymap: QmkKeymapJson = read_json(&qmk_keymap_json)?;
            println!("{}", count_layers(&keymap));
            Ok(())
        }
        Commands::RunOutput { output, command } => {
            run_output(&output, &command).with_context(|| format!("Failed to run command for {}", output.display()))
        }
        Commands::Keycode { expr } => handle_keycode(&expr),
        Commands::Simulate { keyboard_id, script } => handle_simulate(&ctx, &keyboard_id, script.as_deref()),
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run(Cli::parse()) {
        log::error!("{:#}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_output_takes_trailing_command() {
        let cli = Cli::parse_from(["keymap", "run-output", "out.json", "--", "qmk", "c2json", "-kb", "doio/kb16/rev2"]);
        match cli.command {
            Commands::RunOutput { output, command } => {
                assert_eq!(output, PathBuf::from("out.json"));
                assert_eq!(command, vec!["qmk", "c2json", "-kb", "doio/kb16/rev2"]);
            }
            _ => panic!("expected run-output"),
        }
    }

    #[test]
    fn test_format_vial_uid() {
        assert_eq!(
            format_vial_uid(BuiltinKeyboard::Kb16.vial_uid()),
            "0x8F, 0x4D, 0x61, 0x58, 0x92, 0x50, 0x98, 0x7E"
        );
    }

    #[test]
    fn test_keyboards_dir_is_global() {
        let cli = Cli::parse_from(["keymap", "info", "-i", "1", "--keyboards-dir", "boards"]);
        assert_eq!(cli.keyboards_dir, PathBuf::from("boards"));
        let cli = Cli::parse_from(["keymap", "key-to-layer", "--keymap-c", "keymap.c"]);
        assert_eq!(cli.keyboards_dir, PathBuf::from("keyboards"));
        match cli.command {
            Commands::KeyToLayer { prefix, .. } => assert_eq!(prefix, ""),
            _ => panic!("expected key-to-layer"),
        }
    }

    #[test]
    fn test_info_and_simulate_read_keyboard_toml() {
        let dir = tempfile::tempdir().unwrap();
        let keyboard_dir = dir.path().join("keyboards").join("2");
        fs::create_dir_all(&keyboard_dir).unwrap();
        fs::write(
            keyboard_dir.join("keyboard.toml"),
            "[keyboard]\nqmk_keyboard = \"doio/kb16/rev2\"\n\n[raw_hid]\nkeyboard_id = 2\n",
        )
        .unwrap();
        let ctx = ProjectContext::new(dir.path(), dir.path().join("keyboards"));
        handle_info(&ctx, "2", false).unwrap();
        handle_info(&ctx, "2", true).unwrap();

        let script = dir.path().join("script.txt");
        fs::write(&script, "tap 1 4\n").unwrap();
        handle_simulate(&ctx, "2", Some(&script)).unwrap();
        assert!(handle_simulate(&ctx, "3", Some(&script)).is_err());
    }
}
