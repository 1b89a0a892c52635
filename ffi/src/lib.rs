use engine::session::Notice;
use engine::sheet::render_sheet;
use engine::stats::recompute_derived;
use engine::{roll_d20, AdMode, Character, CharacterStore, Dice, FileStorage, StoreError};
use jni::objects::{JClass, JString};
use jni::sys::{jint, jlong, jstring};
use jni::JNIEnv;
use serde_json::{json, Value};
use tracing::warn;

type FfiResult = Result<Value, String>;

fn envelope(result: FfiResult) -> String {
    let payload = match result {
        Ok(value) => json!({ "ok": true, "result": value }),
        Err(e) => json!({ "ok": false, "error": e }),
    };
    payload.to_string()
}

fn raw_or_null(result: jni::errors::Result<JString>) -> jstring {
    match result {
        Ok(s) => s.into_raw(),
        Err(err) => {
            warn!(error = %err, "could not allocate Java string; returning null");
            std::ptr::null_mut()
        }
    }
}

fn to_jstring(env: &JNIEnv, text: String) -> jstring {
    raw_or_null(env.new_string(text))
}

fn reply(env: &JNIEnv, result: FfiResult) -> jstring {
    to_jstring(env, envelope(result))
}

fn read_arg(env: &mut JNIEnv, s: &JString) -> Result<String, String> {
    env.get_string(s)
        .map(|s| s.into())
        .map_err(|e| format!("invalid_argument: {}", e))
}

fn parse_character(json: &str) -> Result<Character, String> {
    serde_json::from_str(json).map_err(|e| format!("invalid_character: {}", e))
}

fn open_store(data_dir: &str) -> CharacterStore<FileStorage> {
    CharacterStore::open(FileStorage::new(data_dir))
}

fn store_error(err: StoreError) -> String {
    match err {
        // in-memory state is dropped with the store, so a failed write is a failure here
        StoreError::Persist { source, .. } => format!("storage_write: {}", source),
        other => other.to_string(),
    }
}

// Internal functions for testing without JNI overhead

pub fn derive_internal(character_json: &str) -> FfiResult {
    let character = parse_character(character_json)?;
    serde_json::to_value(recompute_derived(&character)).map_err(|e| e.to_string())
}

pub fn render_internal(character_json: &str) -> FfiResult {
    let character = parse_character(character_json)?;
    Ok(Value::String(render_sheet(
        &character,
        &recompute_derived(&character),
    )))
}

pub fn list_internal(data_dir: &str) -> FfiResult {
    serde_json::to_value(open_store(data_dir).list()).map_err(|e| e.to_string())
}

pub fn save_internal(data_dir: &str, character_json: &str) -> FfiResult {
    let character = parse_character(character_json)?;
    let index = open_store(data_dir).upsert(character).map_err(store_error)?;
    let message = Notice::Saved { index }.to_string();
    Ok(json!({ "index": index, "message": message }))
}

pub fn load_internal(data_dir: &str, index: i64) -> FfiResult {
    let store = open_store(data_dir);
    let character = store.get(index as isize).map_err(store_error)?;
    serde_json::to_value(character).map_err(|e| e.to_string())
}

pub fn delete_internal(data_dir: &str, index: i64) -> FfiResult {
    let removed = open_store(data_dir)
        .delete(index as isize)
        .map_err(store_error)?;
    let notice = Notice::Deleted {
        index: index as usize,
        name: removed.name,
    };
    let message = notice.to_string();
    Ok(json!({ "message": message }))
}

pub fn roll_internal(seed: i64, modifier: i32) -> FfiResult {
    let mut dice = Dice::from_seed(seed as u64);
    let res = roll_d20(&mut dice, modifier, AdMode::Normal);
    Ok(json!({
        "roll": res.roll,
        "modifier": res.modifier,
        "total": res.total,
        "text": res.to_string(),
    }))
}

#[no_mangle]
pub extern "system" fn Java_com_charsheet_Ffi_version<'local>(
    env: JNIEnv<'local>,
    _class: JClass<'local>,
) -> jstring {
    to_jstring(&env, format!("charsheet-ffi {}", env!("CARGO_PKG_VERSION")))
}

#[no_mangle]
pub extern "system" fn Java_com_charsheet_Ffi_deriveJson(
    mut env: JNIEnv,
    _class: JClass,
    json: JString,
) -> jstring {
    let result = read_arg(&mut env, &json).and_then(|s| derive_internal(&s));
    reply(&env, result)
}

#[no_mangle]
pub extern "system" fn Java_com_charsheet_Ffi_renderSheetJson(
    mut env: JNIEnv,
    _class: JClass,
    json: JString,
) -> jstring {
    let result = read_arg(&mut env, &json).and_then(|s| render_internal(&s));
    reply(&env, result)
}

#[no_mangle]
pub extern "system" fn Java_com_charsheet_Ffi_listCharactersJson(
    mut env: JNIEnv,
    _class: JClass,
    data_dir: JString,
) -> jstring {
    let result = read_arg(&mut env, &data_dir).and_then(|dir| list_internal(&dir));
    reply(&env, result)
}

#[no_mangle]
pub extern "system" fn Java_com_charsheet_Ffi_saveCharacterJson(
    mut env: JNIEnv,
    _class: JClass,
    data_dir: JString,
    json: JString,
) -> jstring {
    let result = read_arg(&mut env, &data_dir).and_then(|dir| {
        let character = read_arg(&mut env, &json)?;
        save_internal(&dir, &character)
    });
    reply(&env, result)
}

#[no_mangle]
pub extern "system" fn Java_com_charsheet_Ffi_loadCharacterJson(
    mut env: JNIEnv,
    _class: JClass,
    data_dir: JString,
    index: jint,
) -> jstring {
    let result = read_arg(&mut env, &data_dir).and_then(|dir| load_internal(&dir, index as i64));
    reply(&env, result)
}

#[no_mangle]
pub extern "system" fn Java_com_charsheet_Ffi_deleteCharacterJson(
    mut env: JNIEnv,
    _class: JClass,
    data_dir: JString,
    index: jint,
) -> jstring {
    let result =
        read_arg(&mut env, &data_dir).and_then(|dir| delete_internal(&dir, index as i64));
    reply(&env, result)
}

#[no_mangle]
pub extern "system" fn Java_com_charsheet_Ffi_rollD20Json(
    env: JNIEnv,
    _class: JClass,
    seed: jlong,
    modifier: jint,
) -> jstring {
    reply(&env, roll_internal(seed, modifier))
}
