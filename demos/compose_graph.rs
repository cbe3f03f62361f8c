//! Example: Compose a filter graph from an LRC document without running FFmpeg.
//!
//! Run with:
//!     cargo run --example compose_graph

use lyric_video::animations::{AnimationCatalog, FrameSpec, TextStyle, TierStyle};
use lyric_video::graph::{compose, GraphInputs, InputLayout};
use lyric_video::lyrics::{build_timeline, parse_lrc};
use lyric_video::RgbColor;
use std::path::PathBuf;

const LYRICS: &str = "\
[ti:Demo]
[00:01.00]Hello world / 你好世界
[00:04.50]Second line / 第二行
[00:08.00]Last line / 最后一行
";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Lyric Video - Graph Composition Example");
    println!("=======================================\n");

    let parsed = parse_lrc(LYRICS);
    let duration = 12.0;
    let lines = build_timeline(&parsed.entries, duration);
    println!("Parsed {} lines ({:?})", lines.len(), parsed.metadata.title);

    let font = PathBuf::from("fonts/NotoSansSC-Regular.otf");
    let style = TextStyle {
        primary: TierStyle {
            font: font.clone(),
            size: 48,
            color: RgbColor::WHITE,
        },
        secondary: TierStyle {
            font,
            size: 32,
            color: RgbColor::from_hex("#dddddd").ok_or("bad color")?,
        },
        outline_color: RgbColor::BLACK,
        outline_width: 2,
    };

    let catalog = AnimationCatalog::builtin();
    let background = catalog.background("gradient-wave")?;
    let layout = InputLayout::plan(background.is_generative(), false, true);
    let graph = compose(&GraphInputs {
        frame: FrameSpec::new(1280, 720, 30).ok_or("invalid frame")?,
        duration,
        layout,
        background,
        cover: catalog.cover("vinyl-record")?,
        text: catalog.text("scrolling-list")?,
        lines: &lines,
        style: &style,
        preview_frame: None,
    });
    graph.validate_inputs(layout.input_count())?;

    println!("Inputs: {}\n", layout.input_count());
    for statement in graph.statements() {
        println!("{statement}\n");
    }
    Ok(())
}
