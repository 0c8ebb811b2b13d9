fn main() {
    // Propagate the ESP-IDF link environment only for firmware builds;
    // host test builds have no ESP-IDF toolchain.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
