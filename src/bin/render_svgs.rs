use ga_tsp_solver::visualization::Visualizer;
use std::fs;
use std::path::PathBuf;

fn main() {
    let dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("Routes"));
    if !dir.is_dir() {
        eprintln!("{:?} not found", dir);
        std::process::exit(1);
    }

    let entries = match fs::read_dir(&dir) {
        Ok(entries) => entries,
        Err(e) => {
            eprintln!("Failed to read {:?}: {}", dir, e);
            std::process::exit(1);
        }
    };

    let mut failed = 0usize;
    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().map(|e| e == "svg").unwrap_or(false) {
            let svg = match fs::read_to_string(&path) {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("Failed to read {:?}: {}", path, e);
                    failed += 1;
                    continue;
                }
            };
            let out = path.with_extension("png");
            match Visualizer::svg_to_png_file(&svg, &out) {
                Ok(()) => println!("Converted {:?} -> {:?}", path, out),
                Err(e) => {
                    eprintln!("Failed to convert {:?}: {}", path, e);
                    failed += 1;
                }
            }
        }
    }

    if failed > 0 {
        std::process::exit(1);
    }
}
