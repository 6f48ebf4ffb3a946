extern crate spcadec;
use spcadec::prelude::*;

/// Decode a single frame that was dumped from a camera, and store it as a png file.
/// Set `RUST_LOG=debug` to see why a frame is dropped.
///
/// `cargo run --example raw_to_png -- frame.raw jpeg411 352 288 frame.png`
fn main() {
    env_logger::init();

    let usage = "usage: raw_to_png <raw frame> <encoding> <width> <height> [png file]";
    let arguments: Vec<String> = std::env::args().skip(1).collect();
    if arguments.len() < 4 { eprintln!("{}", usage); std::process::exit(2); }

    let encoding = match arguments[1].as_str() {
        "jpeg411" => NativeEncoding::Jpeg411,
        "jpeg422-tagged" => NativeEncoding::Jpeg422Tagged,
        "jpeg422-conexant" => NativeEncoding::Jpeg422Conexant,
        "jpeg422" => NativeEncoding::Jpeg422Bare,
        "yuvy" => NativeEncoding::Yuvy,
        "yuyv" => NativeEncoding::Yuyv,
        "yyuv" => NativeEncoding::Yyuv,
        "gbrg" => NativeEncoding::BayerGbrg,
        "tv8532" => NativeEncoding::BayerTv8532,
        "sonix" => NativeEncoding::SonixPacked,
        other => panic!("unknown encoding `{}`", other),
    };

    let size = Vec2(
        arguments[2].parse::<usize>().expect("width must be a number"),
        arguments[3].parse::<usize>().expect("height must be a number"),
    );

    let png_path = arguments.get(4).cloned().unwrap_or_else(|| format!("{}.png", arguments[0]));
    let input = std::fs::read(&arguments[0]).expect("frame file cannot be read");

    let context = DecoderContext::default();
    let mut frame = Frame::new(encoding, OutputFormat::Rgb24, FrameGeometry::uncropped(size), input);

    // the bayer compositors store blue first, unless rgb order is forced
    if encoding.is_bayer() {
        context.change_settings(context.picture_settings().with_force_rgb(true));
    }

    context.decode_frame(&mut frame).expect("frame cannot be decoded");

    let pixels = frame.take_output().expect("decoded frame has pixels");
    let image = image::RgbImage::from_raw(size.width() as u32, size.height() as u32, pixels)
        .expect("output matches the frame size");

    image.save(&png_path).expect("png file cannot be written");
    println!("decoded {} frame of {} into {}", encoding, size, png_path);
}
