use std::env;

fn main() {
    println!("cargo:rerun-if-env-changed=LIBJXL_LIB_PATH");

    // --- libjxl system library (feature "libjxl") ---
    if env::var_os("CARGO_FEATURE_LIBJXL").is_none() {
        return;
    }

    // Optional: point the linker at a non-standard libjxl install
    if let Ok(lib_path) = env::var("LIBJXL_LIB_PATH") {
        println!("cargo:rustc-link-search=native={lib_path}");
    }

    println!("cargo:rustc-link-lib=jxl");

    // libjxl is C++, so we need the C++ standard library when linking statically
    if env::var_os("LIBJXL_STATIC").is_some() {
        println!("cargo:rustc-link-lib=stdc++");
    }
    println!("cargo:rerun-if-env-changed=LIBJXL_STATIC");
}
