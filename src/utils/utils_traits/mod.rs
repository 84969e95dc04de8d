use serde::de::DeserializeOwned;
use serde::Serialize;
use crate::utils::utils_console::trajviz_print_error;
use crate::utils::utils_errors::TrajvizError;

pub trait ToAndFromRonString: Serialize + DeserializeOwned {
    fn to_ron_string(&self) -> String {
        ron::to_string(self).unwrap_or_default()
    }
    fn load_from_ron_string(ron_string: &str) -> Result<Self, TrajvizError> where Self: Sized {
        let load: Result<Self, _> = ron::from_str(ron_string);
        return if let Ok(load) = load { Ok(load) } else {
            Err(TrajvizError::new_generic_error_str(&format!("Could not load ron string {:?} into correct type.", ron_string), file!(), line!()))
        }
    }
}
impl <T> ToAndFromRonString for T where T: Serialize + DeserializeOwned {  }

pub trait ToAndFromJsonString: Serialize + DeserializeOwned {
    fn to_json_string(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
    fn load_from_json_string(json_str: &str) -> Result<Self, TrajvizError> where Self: Sized {
        load_object_from_json_string(json_str)
    }
}
impl <T> ToAndFromJsonString for T where T: Serialize + DeserializeOwned {  }

pub fn load_object_from_json_string<T: DeserializeOwned>(json_str: &str) -> Result<T, TrajvizError> {
    let o_res = serde_json::from_str(json_str);
    return match o_res {
        Ok(o) => {
            Ok(o)
        }
        Err(e) => {
            trajviz_print_error(&format!("load_object_from_json_string() failed: {}", e));
            Err(TrajvizError::new_generic_error_str("load_object_from_json_string() failed.  The given json_string is incompatible with the requested type.", file!(), line!()))
        }
    }
}
