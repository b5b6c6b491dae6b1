use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use crate::component::Configuration;
use crate::config::{Environment, EnvironmentPropertySource, TomlPropertySource};
use crate::error::{ApplicationError, ApplicationResult};
use crate::logging::LoggingConfig;
use crate::ApplicationContext;

/// 应用程序启动器
///
/// 负责加载配置、初始化日志、注册配置类和扫描到的组件，最后预实例化所有单例
pub struct InjectionApplication {
    /// 应用名称（可被 `app.name` 覆盖）
    name: String,

    /// 配置文件路径
    config_files: Vec<String>,

    /// 环境变量前缀
    env_prefix: String,

    /// 激活的 profiles
    profiles: Vec<String>,

    /// 是否显示 banner（可被 `app.banner` 覆盖）
    show_banner: bool,

    /// 日志配置，未设置时从 Environment 读取
    logging_config: Option<LoggingConfig>,

    /// 是否安装全局日志订阅者
    init_logging: bool,

    /// 配置类，先于组件扫描注册
    configurations: Vec<Box<dyn Configuration>>,
}

impl InjectionApplication {
    /// 创建新的应用
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            config_files: vec!["application.toml".to_string()],
            env_prefix: "APP_".to_string(),
            profiles: Vec::new(),
            show_banner: true,
            logging_config: None,
            init_logging: true,
            configurations: Vec::new(),
        }
    }

    /// 设置配置文件路径
    pub fn config_file(mut self, path: impl Into<String>) -> Self {
        self.config_files = vec![path.into()];
        self
    }

    /// 添加多个配置文件
    pub fn config_files(mut self, paths: Vec<String>) -> Self {
        self.config_files = paths;
        self
    }

    /// 设置环境变量前缀
    pub fn env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// 设置激活的 profiles
    pub fn profiles(mut self, profiles: Vec<String>) -> Self {
        self.profiles = profiles;
        self
    }

    /// 设置是否显示 banner
    pub fn banner(mut self, show: bool) -> Self {
        self.show_banner = show;
        self
    }

    /// 设置日志配置
    ///
    /// 如果不设置，将从 Environment 的 `logging.*` 键和环境变量读取
    pub fn logging(mut self, config: LoggingConfig) -> Self {
        self.logging_config = Some(config);
        self
    }

    /// 是否安装全局日志订阅者（测试中可关闭，自行安装捕获层）
    pub fn init_logging(mut self, enabled: bool) -> Self {
        self.init_logging = enabled;
        self
    }

    /// 添加配置类
    pub fn configuration(mut self, configuration: impl Configuration + 'static) -> Self {
        self.configurations.push(Box::new(configuration));
        self
    }

    /// 运行应用
    pub fn run(self) -> ApplicationResult<Arc<ApplicationContext>> {
        let start_time = Instant::now();

        // 解析 active profiles
        // 优先级：代码设置 > 环境变量 APP_PROFILES_ACTIVE
        let active_profiles = self.resolve_profiles();

        let environment = Arc::new(Environment::new());
        self.load_configurations(&environment, &active_profiles)?;
        environment.add_property_source(Box::new(EnvironmentPropertySource::new(&self.env_prefix)));
        environment.set_active_profiles(active_profiles.clone());

        if self.init_logging {
            let logging_config = self
                .logging_config
                .clone()
                .unwrap_or_else(|| LoggingConfig::from_environment(&environment));
            logging_config.init()?;
        }

        let name = environment.get_string_or("app.name", &self.name);

        if environment.get_bool_or("app.banner", self.show_banner) {
            self.print_banner();
        }

        tracing::info!("Starting {} application", name);

        if active_profiles.is_empty() {
            tracing::info!("No active profiles set, using default configuration");
        } else {
            tracing::info!("Active profiles: {:?}", active_profiles);
        }
        tracing::debug!("Environment variable prefix: {}", self.env_prefix);

        let context = ApplicationContext::builder()
            .environment(environment)
            .app_name(name.clone())
            .build()?;
        tracing::info!("ApplicationContext created");

        for configuration in &self.configurations {
            tracing::info!("Registering configuration '{}'", configuration.name());
            context.register_configuration(configuration.as_ref())?;
        }

        tracing::info!("Scanning for component beans");
        context.scan_components()?;

        tracing::info!("Validating bean dependencies");
        context.validate_dependencies()?;

        tracing::info!("Initializing non-lazy singleton beans");
        context.initialize()?;
        tracing::info!("ApplicationContext initialized");

        tracing::info!("Started {} in {}ms", name, start_time.elapsed().as_millis());

        Ok(context)
    }

    fn resolve_profiles(&self) -> Vec<String> {
        if !self.profiles.is_empty() {
            return self.profiles.clone();
        }

        std::env::var(format!("{}PROFILES_ACTIVE", self.env_prefix))
            .map(|profiles| {
                profiles
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// 加载配置文件
    ///
    /// 加载顺序（优先级从低到高）：
    /// 1. application.toml (default)
    /// 2. application-{profile}.toml (profile specific)
    fn load_configurations(
        &self,
        environment: &Environment,
        active_profiles: &[String],
    ) -> ApplicationResult<()> {
        for base_config in &self.config_files {
            Self::try_load_config_file(environment, base_config, 0)?;
        }

        for (index, profile) in active_profiles.iter().enumerate() {
            for base_config in &self.config_files {
                let profile_config = Self::profile_config_path(base_config, profile);
                Self::try_load_config_file(environment, &profile_config, 10 + index as i32)?;
            }
        }

        Ok(())
    }

    /// 例如：application.toml -> application-dev.toml
    fn profile_config_path(base_path: &str, profile: &str) -> String {
        match base_path.rfind('.') {
            Some(dot_pos) => {
                let (name, ext) = base_path.split_at(dot_pos);
                format!("{}-{}{}", name, profile, ext)
            }
            None => format!("{}-{}", base_path, profile),
        }
    }

    /// 文件不存在时跳过，存在但无法解析时报错
    fn try_load_config_file(
        environment: &Environment,
        config_file: &str,
        priority: i32,
    ) -> ApplicationResult<()> {
        if !Path::new(config_file).exists() {
            tracing::debug!("Configuration file not found: {}", config_file);
            return Ok(());
        }

        let source = TomlPropertySource::from_file(config_file)
            .map_err(|e| ApplicationError::ConfigLoadFailed(format!("{:#}", e)))?;
        environment.add_property_source(Box::new(source.with_priority(priority)));
        tracing::debug!("Loaded configuration from: {} (priority: {})", config_file, priority);

        Ok(())
    }

    fn print_banner(&self) {
        println!();
        println!(r"  ___       _           _   _             ");
        println!(r" |_ _|_ __ (_) ___  ___| |_(_) ___  _ __  ");
        println!(r"  | || '_ \| |/ _ \/ __| __| |/ _ \| '_ \ ");
        println!(r"  | || | | | |  __/ (__| |_| | (_) | | | |");
        println!(r" |___|_| |_/ |\___|\___|\__|_|\___/|_| |_|");
        println!(r"         |__/                              ");
        println!();
        println!("  :: Injection ::        (v{})", env!("CARGO_PKG_VERSION"));
        println!();
    }
}

impl Default for InjectionApplication {
    fn default() -> Self {
        Self::new("InjectionApplication")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BeanDefinition, Container, ContainerResult};

    struct Greeting(&'static str);

    struct GreetingConfig;

    impl Configuration for GreetingConfig {
        fn name(&self) -> &str {
            "greetingConfig"
        }

        fn register_beans(&self, context: &Arc<ApplicationContext>) -> ContainerResult<()> {
            context.register(BeanDefinition::from_fn("greeting", || Ok(Greeting("hello"))))
        }
    }

    fn quiet(name: &str) -> InjectionApplication {
        InjectionApplication::new(name)
            .config_file("/definitely/not/here/application.toml")
            .env_prefix("INJTEST_APP_")
            .banner(false)
            .init_logging(false)
    }

    #[test]
    fn test_profile_config_path() {
        assert_eq!(
            InjectionApplication::profile_config_path("application.toml", "dev"),
            "application-dev.toml"
        );
        assert_eq!(
            InjectionApplication::profile_config_path("config/app", "prod"),
            "config/app-prod"
        );
    }

    #[test]
    fn test_run_registers_configuration_and_initializes() {
        let context = quiet("greeter")
            .profiles(vec!["test".to_string()])
            .configuration(GreetingConfig)
            .run()
            .unwrap();

        assert!(context.is_active());
        assert_eq!(context.get_app_name().as_deref(), Some("greeter"));
        assert!(context.environment().accepts_profile("test"));

        let greeting = context.get_bean_of::<Greeting>("greeting").unwrap();
        assert_eq!(greeting.0, "hello");
    }

    #[test]
    fn test_unparseable_config_file_fails_startup() {
        let path = std::env::temp_dir().join(format!("injection-broken-{}.toml", std::process::id()));
        std::fs::write(&path, "[app\nname = ").unwrap();

        let result = quiet("broken")
            .config_file(path.to_string_lossy().into_owned())
            .run();
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(result, Err(ApplicationError::ConfigLoadFailed(_))));
    }
}
