use crate::core::config::{EnvSnapshot, PYTHON_ENV, VIRTUAL_ENV};
use crate::core::runtime::effects::PythonRuntime;

/// Reports whether execution already happens inside a virtual environment.
///
/// `VIRTUAL_ENV` short-circuits; otherwise the active interpreter is asked for
/// its prefixes. Any probe failure reads as "not isolated".
pub fn is_isolated(env: &EnvSnapshot, runtime: &dyn PythonRuntime) -> bool {
    if env.contains(VIRTUAL_ENV) {
        return true;
    }
    let python = match runtime.detect_interpreter(env.var(PYTHON_ENV)) {
        Ok(python) => python,
        Err(err) => {
            tracing::debug!("isolation probe skipped: {err:#}");
            return false;
        }
    };
    match runtime.probe(&python) {
        Ok(info) => info.is_virtual(),
        Err(err) => {
            tracing::debug!("isolation probe failed for {python}: {err:#}");
            false
        }
    }
}
