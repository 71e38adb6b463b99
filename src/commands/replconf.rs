use crate::resp::RespValue;

pub fn replconf() -> Vec<u8> {
    RespValue::SimpleString("OK".to_string()).encode()
}
