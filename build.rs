// Stamps BUILD_DATE, printed in the startup log line
fn main() {
    let stamp = chrono::Utc::now().format("%Y-%m-%d %H:%M UTC");
    println!("cargo:rustc-env=BUILD_DATE={}", stamp);
    println!("cargo:rerun-if-changed=src");
    println!("cargo:rerun-if-changed=crates");
}
