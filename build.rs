use std::env;
use std::fs;
use std::path::PathBuf;

const KERNEL_SOURCE: &str = "native/tensor_add.c";

fn main() {
    println!("cargo:rerun-if-changed={}", KERNEL_SOURCE);

    // The kernel is built as a standalone shared library in OUT_DIR/native and loaded at runtime.
    // A failed build is only a warning, the native strategy then reports itself unavailable.
    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR not set")).join("native");
    fs::create_dir_all(&out_dir).expect("failed to create OUT_DIR/native");

    let target_os = env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();
    let lib_name = match target_os.as_str() {
        "macos" | "ios" => "libtensor_add.dylib",
        "windows" => {
            println!("cargo:warning=native addition kernel is not built on windows");
            return;
        }
        _ => "libtensor_add.so",
    };
    let out_path = out_dir.join(lib_name);

    let compiler = match cc::Build::new()
        .opt_level(2)
        .cargo_metadata(false)
        .try_get_compiler()
    {
        Ok(c) => c,
        Err(e) => {
            println!("cargo:warning=no C compiler for the native addition kernel: {}", e);
            return;
        }
    };

    if compiler.is_like_msvc() {
        println!("cargo:warning=native addition kernel needs a gcc or clang style compiler");
        return;
    }

    let result = compiler
        .to_command()
        .arg("-shared")
        .arg("-fPIC")
        .arg("-o")
        .arg(&out_path)
        .arg(KERNEL_SOURCE)
        .output();

    match result {
        Ok(o) if o.status.success() => {
            println!("cargo:rustc-env=TENSORADD_NATIVE_LIB={}", out_path.display());
        }
        Ok(o) => println!(
            "cargo:warning=failed to compile {}: {}",
            KERNEL_SOURCE,
            String::from_utf8_lossy(&o.stderr).replace('\n', " ")
        ),
        Err(e) => println!(
            "cargo:warning=failed to run the C compiler for {}: {}",
            KERNEL_SOURCE, e
        ),
    }
}
