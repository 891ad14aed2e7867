fn main() {
    // Only the device build links against ESP-IDF; host builds (tests,
    // fuzzing) compile the pure-logic library with simulation stubs.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
