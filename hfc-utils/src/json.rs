use anyhow::{anyhow, Context, Result};
use flate2::{read::ZlibDecoder, write::ZlibEncoder, Compression};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{to_string, to_value, Map, Value};
use std::{
    fs,
    io::{Read, Write},
};

pub fn dejsonify<'a, T>(json_str: &'a str) -> serde_json::Result<T>
where
    T: Deserialize<'a>,
{
    serde_json::from_str::<T>(json_str)
}

/// Serializes with object keys sorted at every level, so equal values always
/// produce identical text.
pub fn jsonify<T>(obj: &T) -> Result<String>
where
    T: Serialize,
{
    let value = to_value(obj)?;
    Ok(to_string(&jsonify_internal(&value))?)
}

pub fn jsonify_internal(json_value: &Value) -> Value {
    match json_value {
        Value::Object(obj) => {
            let mut keys: Vec<&String> = obj.keys().collect();
            keys.sort();
            let mut sorted_map = Map::new();
            for key in keys {
                sorted_map.insert(key.clone(), jsonify_internal(&obj[key]));
            }
            Value::Object(sorted_map)
        }
        Value::Array(items) => Value::Array(items.iter().map(jsonify_internal).collect()),
        _ => json_value.clone(),
    }
}

pub fn compress_obj<T>(input: &T) -> Result<Vec<u8>>
where
    T: Serialize,
{
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(jsonify(input)?.as_bytes())?;
    Ok(encoder.finish()?)
}

pub fn decompress_obj<T>(input: &[u8]) -> Result<T>
where
    T: DeserializeOwned,
{
    let mut decoder = ZlibDecoder::new(input);
    let mut decompressed = String::new();
    decoder.read_to_string(&mut decompressed)?;
    Ok(dejsonify(&decompressed)?)
}

/// Resolves a command line json argument: `-` reads stdin, a path ending in
/// `.json` reads the file, anything else is taken as inline json.
pub fn read_json_arg(arg: &str) -> Result<String> {
    if arg == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read json from stdin")?;
        Ok(buffer)
    } else if arg.ends_with(".json") {
        fs::read_to_string(arg).with_context(|| format!("Failed to read json file: {}", arg))
    } else if arg.trim().is_empty() {
        Err(anyhow!("Empty json argument"))
    } else {
        Ok(arg.to_string())
    }
}

pub fn load_json_arg<T>(arg: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    let json = read_json_arg(arg)?;
    serde_json::from_str::<T>(&json).with_context(|| format!("Failed to parse json: {}", arg))
}
