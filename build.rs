fn main() {
    // MCU cfgs (`esp32`, `esp32s3`, ...) come from the ESP-IDF sysenv below.
    println!("cargo::rustc-check-cfg=cfg(esp32)");
    println!("cargo:rerun-if-env-changed=PROBE_WIFI_SSID");
    println!("cargo:rerun-if-env-changed=PROBE_WIFI_PASSWORD");

    if std::env::var("PROBE_WIFI_SSID").is_err() {
        println!("cargo:warning=PROBE_WIFI_SSID not set; firmware will boot without credentials");
    }

    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
