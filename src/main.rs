//! pointbridge demo entry point.

mod cli;

use clap::Parser;
use cli::{Cli, Command};
use pointbridge::{Boundary, BridgeResult, MutableByteBuffer, Point, declared_point_layout};

fn main() {
    let cli = Cli::parse();
    pointbridge::logging::init(cli.verbose);

    let boundary = match Boundary::new(cli.config()) {
        Ok(boundary) => boundary,
        Err(e) => {
            eprintln!("Binding failed: {e}");
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Command::Demo => demo(&boundary),
        Command::Layout => {
            layout(&boundary);
            Ok(())
        }
        Command::Mutate { text } => mutate(&boundary, &text),
    };

    if let Err(e) = result.and_then(|()| boundary.close()) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn demo(boundary: &Boundary) -> BridgeResult<()> {
    let mut point = Point::new(10, 20);

    println!("=== By value ===");
    boundary.show(point);
    boundary.move_point(point);
    println!("host still holds {point}");

    println!("\n=== By reference ===");
    boundary.show_ref(&point);
    boundary.move_ref(&mut point);
    println!("host now holds {point}");

    println!("\n=== Returned by value ===");
    for _ in 0..2 {
        let fresh = boundary.get_point()?;
        println!("host received {fresh}");
    }

    println!("\n=== Returned by reference ===");
    let last = boundary.with_point_pointer(|owned| -> BridgeResult<Point> {
        owned.show()?;
        owned.move_ref()?;
        owned.get()
    })??;
    println!("native storage held {last} before release");

    println!("\n=== Mutable buffer ===");
    let source = "staring string";
    let mutated = boundary.mutated_copy(source)?;
    println!("source {source:?} -> buffer {:?}", mutated.to_string_lossy());
    if let Err(e) = boundary.add_one_to_string(source) {
        println!("immutable text rejected: {e}");
    }

    println!("\n=== Native transcript ===");
    for line in boundary.transcript() {
        println!("  {line}");
    }
    let stats = boundary.stats();
    println!(
        "\nallocations: {} allocated, {} released, peak {}",
        stats.allocated, stats.released, stats.peak_outstanding
    );
    Ok(())
}

fn layout(boundary: &Boundary) {
    let declared = declared_point_layout();
    let native = boundary.layout();
    println!("{:<10} {:>8} {:>8}", "attribute", "declared", "native");
    for (name, d, n) in [
        ("size", declared.size, native.size),
        ("align", declared.align, native.align),
        ("x offset", declared.x_offset, native.x_offset),
        ("x size", declared.x_size, native.x_size),
        ("y offset", declared.y_offset, native.y_offset),
        ("y size", declared.y_size, native.y_size),
    ] {
        println!("{name:<10} {d:>8} {n:>8}");
    }
}

fn mutate(boundary: &Boundary, text: &str) -> BridgeResult<()> {
    let mut buffer = MutableByteBuffer::from_text(text)?;
    boundary.add_one_to_string(&mut buffer)?;
    println!("{}", buffer.to_string_lossy());
    Ok(())
}
