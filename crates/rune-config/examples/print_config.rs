/// Example program to print the loaded configuration
///
/// Run with: cargo run -p rune-config --example print_config

fn main() {
    let config = rune_config::RuneConfig::load();

    println!("=== Rune Navigation Configuration ===\n");

    println!("Navigation Settings:");
    println!("  Enable Gestures: {}", config.navigation.enable_gestures);
    println!(
        "  Gesture On First Scene: {}",
        config.navigation.enable_gesture_on_first_scene
    );
    println!("  Hide Inactive Scenes: {}", config.navigation.hide_non_active_scenes);
    println!(
        "  Intercept Timeout: {}ms",
        config.navigation.intercept_touch_timeout_ms
    );
    println!("  Default Scene Config: {}", config.navigation.default_scene_config);
    println!(
        "  Initial Viewport: {:?} x {:?}",
        config.navigation.initial_width, config.navigation.initial_height
    );
    println!();

    println!("Gesture Settings:");
    println!("  Max Duration: {}ms", config.gestures.max_duration_ms);
    println!("  Position Threshold: {}", config.gestures.position_threshold);
    println!("  Respond Threshold: {}px", config.gestures.respond_threshold);
    println!("  Velocity Threshold: {}px/ms", config.gestures.velocity_threshold);
    println!();

    match toml::to_string_pretty(&config) {
        Ok(toml_str) => {
            println!("=== Serialized Configuration ===");
            println!("{}", toml_str);
        }
        Err(e) => {
            eprintln!("Failed to serialize config: {}", e);
        }
    }
}
