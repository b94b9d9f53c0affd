/// build.rs — generate static Cartesian component tables.
///
/// Emits `$OUT_DIR/cart_tables.rs` which contains:
///   - `CART_L0` .. `CART_L7`: `[[u8; 3]; ncart(l)]` exponent triples (lx, ly, lz)
///   - `CART_TABLES`: `[&[[u8; 3]]; 8]` indexed by angular momentum
///
/// Evaluators index these tables per shell instead of rebuilding the
/// component list, keeping the per-block hot path allocation free.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const LMAX: usize = 7;

fn main() -> std::io::Result<()> {
    println!("cargo:rerun-if-changed=build.rs");

    let out_dir = std::env::var("OUT_DIR").expect("cargo sets OUT_DIR for build scripts");
    let dest = Path::new(&out_dir).join("cart_tables.rs");
    let mut f = BufWriter::new(File::create(dest)?);

    // libcint order: lx descending, then ly descending within each lx block.
    for l in 0..=LMAX {
        let mut triples = Vec::new();
        for lx in (0..=l).rev() {
            for ly in (0..=(l - lx)).rev() {
                triples.push(format!("[{lx}, {ly}, {}]", l - lx - ly));
            }
        }
        writeln!(
            f,
            "const CART_L{l}: [[u8; 3]; {}] = [{}];",
            triples.len(),
            triples.join(", ")
        )?;
    }

    writeln!(f, "\n/// Cartesian exponent triples `(lx, ly, lz)` for l = 0..={LMAX}, libcint order.")?;
    write!(f, "pub static CART_TABLES: [&[[u8; 3]]; {}] = [", LMAX + 1)?;
    for l in 0..=LMAX {
        write!(f, "&CART_L{l}, ")?;
    }
    writeln!(f, "];")?;
    Ok(())
}
