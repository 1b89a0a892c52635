// Exercise the bridge without a JVM: same calls the Java side makes, minus JNI.
use ffi::{delete_internal, derive_internal, list_internal, roll_internal, save_internal};

fn main() {
    let dir = std::env::temp_dir().join("charsheet-ffi-demo");
    let dir = dir.to_string_lossy();

    let aria = r#"{ "name": "Aria", "level": 5, "stats": { "dexterity": 18 } }"#;
    println!("derive: {:?}", derive_internal(aria).map(|v| v["proficiency_bonus"].clone()));
    println!("save:   {:?}", save_internal(&dir, aria));
    println!("list:   {:?}", list_internal(&dir));
    println!("roll:   {:?}", roll_internal(2025, 4));
    println!("delete: {:?}", delete_internal(&dir, 0));
    println!("list:   {:?}", list_internal(&dir));
}
