//! Exports a build stamp used in the `writer` metadata of saved transfer files.

fn main() {
    println!("cargo:rerun-if-env-changed=POSELIB_BUILD_STAMP");

    let stamp = match std::env::var("POSELIB_BUILD_STAMP") {
        Ok(stamp) => stamp,
        Err(_) => {
            let format = time::format_description::parse("[year]-[month]-[day] [hour]:[minute]")
                .expect("valid stamp format");
            time::OffsetDateTime::now_utc()
                .format(&format)
                .unwrap_or_else(|_| "unknown".to_string())
        }
    };

    println!("cargo:rustc-env=POSELIB_BUILD_STAMP={}", stamp);
}
