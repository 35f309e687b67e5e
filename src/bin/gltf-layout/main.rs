//! glTF layout CLI - build and inspect packed glTF buffers.

use gltf_layout::description::LayoutDescription;
use gltf_layout::prelude::*;
use std::env;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

fn main() {
    let args: Vec<String> = env::args().collect();

    // Parse global flags
    let mut level = "info";
    let mut filtered_args: Vec<&str> = Vec::new();
    for arg in &args[1..] {
        match arg.as_str() {
            "-v" | "--verbose" => level = "debug",
            "-vv" | "--trace" => level = "trace",
            "-q" | "--quiet" => level = "error",
            _ => filtered_args.push(arg),
        }
    }
    init_logging(level);

    if filtered_args.is_empty() {
        print_help();
        return;
    }

    let result = match filtered_args[0] {
        // Demo command - indices + positions example
        "demo" => cmd_demo(),

        // Pack command - build a description and write the buffers
        "pack" | "p" => {
            if filtered_args.len() < 2 {
                eprintln!("Error: missing file argument");
                eprintln!("Usage: gltf-layout pack <layout.json> [-o out.bin]");
                std::process::exit(1);
            }
            let output = filtered_args
                .iter()
                .position(|&s| s == "-o" || s == "--output")
                .and_then(|i| filtered_args.get(i + 1))
                .map(|s| PathBuf::from(*s));
            cmd_pack(filtered_args[1], output.as_deref())
        }

        // Dump command - hex dump with padding marked
        "dump" | "d" => {
            if filtered_args.len() < 2 {
                eprintln!("Error: missing file argument");
                eprintln!("Usage: gltf-layout dump <layout.json>");
                std::process::exit(1);
            }
            cmd_dump(filtered_args[1])
        }

        // Help
        "help" | "h" | "-h" | "--help" => {
            print_help();
            Ok(())
        }

        _ => {
            eprintln!("Unknown command: {}", filtered_args[0]);
            eprintln!();
            print_help();
            std::process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn print_help() {
    println!("gltf-layout - glTF buffer layout toolkit");
    println!();
    println!("USAGE:");
    println!("    gltf-layout [OPTIONS] <COMMAND> [ARGS]");
    println!();
    println!("COMMANDS:");
    println!("    demo                          Pack indices + positions and show the layout");
    println!("    p, pack <layout.json> [-o f]  Build a layout, show it, write buffers to f");
    println!("    d, dump <layout.json>         Hex dump of every buffer, padding shown as ..");
    println!("    h, help                       Show this help");
    println!();
    println!("OPTIONS:");
    println!("    -v, --verbose    Show debug output");
    println!("    -vv, --trace     Show trace output (very verbose)");
    println!("    -q, --quiet      Only show errors");
    println!();
    println!("NOTES:");
    println!("    - RUST_LOG overrides the verbosity flags");
    println!("    - With several buffers, -o out.bin writes out.bin, out.1.bin, ...");
}

fn cmd_demo() -> Result<()> {
    let mut builder = BufferStructureBuilder::new();
    let mut views = ViewBatch::new();

    let mut batch = AccessorBatch::new();
    builder.create_named_accessor_from_slice(&mut batch, "indices", ElementType::Scalar, &[0u16, 1, 2])?;
    builder.create_buffer_view_model(&mut views, batch, Some(Target::ElementArrayBuffer))?;

    let mut batch = AccessorBatch::new();
    builder.create_vec3_accessor(&mut batch, &[Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::Z])?;
    builder.create_buffer_view_model(&mut views, batch, Some(Target::ArrayBuffer))?;

    builder.create_buffer_model(views, None)?;
    let structure = builder.build();
    structure.validate()?;

    print!("{}", structure);
    print_bounds(&structure)?;
    Ok(())
}

fn load(path: &str) -> Result<BufferStructure> {
    info!("Loading layout: {}", path);
    let description = LayoutDescription::from_reader(File::open(path)?)?;
    let structure = description.build()?;
    debug!(
        "{} accessors, {} views, {} buffers",
        structure.num_accessors(),
        structure.num_buffer_views(),
        structure.num_buffers()
    );
    Ok(structure)
}

fn cmd_pack(path: &str, output: Option<&Path>) -> Result<()> {
    let structure = load(path)?;
    print!("{}", structure);
    print_bounds(&structure)?;

    if let Some(output) = output {
        for (bi, buffer) in structure.buffers() {
            let target = if bi.index() == 0 {
                output.to_path_buf()
            } else {
                output.with_extension(format!("{}.bin", bi.index()))
            };
            std::fs::write(&target, buffer.data())?;
            info!("Wrote {} ({} bytes)", target.display(), buffer.byte_length());
        }
    }
    Ok(())
}

fn cmd_dump(path: &str) -> Result<()> {
    let structure = load(path)?;
    for (bi, buffer) in structure.buffers() {
        println!(
            "buffer {} \"{}\" ({} bytes, {} padding)",
            bi,
            buffer.id(),
            buffer.byte_length(),
            buffer.padding_byte_count()
        );
        for (row, chunk) in buffer.data().chunks(16).enumerate() {
            let mut line = format!("  {:08x}:", row * 16);
            for (i, byte) in chunk.iter().enumerate() {
                if buffer.is_padding_byte_index(row * 16 + i) {
                    line.push_str(" ..");
                } else {
                    line.push_str(&format!(" {:02x}", byte));
                }
            }
            println!("{}", line);
        }
    }
    Ok(())
}

fn print_bounds(structure: &BufferStructure) -> Result<()> {
    for (ai, accessor) in structure.accessors() {
        if let Some(bounds) = structure.accessor_bounds(ai)? {
            println!("  {} min={:?} max={:?}", accessor.id(), bounds.min, bounds.max);
        }
    }
    Ok(())
}
