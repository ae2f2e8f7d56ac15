//! Configuration access port trait.

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str, default: i64) -> i64;
    fn get_double(&self, section: &str, key: &str, default: f64) -> f64;
    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool;

    /// Non-empty value, trimmed.
    fn get_nonempty(&self, section: &str, key: &str) -> Option<String> {
        self.get_string(section, key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    /// Credential lookup: `env_var` resolved through `env` wins over the file.
    fn get_secret(
        &self,
        section: &str,
        key: &str,
        env_var: &str,
        env: &dyn Fn(&str) -> Option<String>,
    ) -> Option<String> {
        env(env_var)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .or_else(|| self.get_nonempty(section, key))
    }
}
