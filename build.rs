fn main() {
    println!("cargo:rerun-if-env-changed=SMARTBIN_DEVICE_ID");
    println!("cargo:rerun-if-env-changed=SMARTBIN_WIFI_SSID");
    println!("cargo:rerun-if-env-changed=SMARTBIN_WIFI_PASS");
    println!("cargo:rerun-if-env-changed=SMARTBIN_MQTT_HOST");
    println!("cargo:rerun-if-env-changed=SMARTBIN_MQTT_PORT");

    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
