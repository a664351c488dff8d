/// 服务器配置 - 俱乐部后端的所有配置项
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | /var/lib/club | 工作目录（数据库、日志） |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | SUMMARY_CACHE_TTL_SECS | 300 | 会籍摘要缓存 TTL（秒） |
/// | EXPIRY_SWEEP_INTERVAL_SECS | 3600 | 到期扫描间隔（秒） |
/// | AUDIT_BUFFER_SIZE | 256 | 审计日志队列容量 |
/// | NOTIFY_BUFFER_SIZE | 256 | 通知队列容量 |
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库和日志文件
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 运行环境: development | staging | production
    pub environment: String,
    /// 摘要缓存 TTL（秒）— 写操作会显式失效对应条目
    pub summary_cache_ttl_secs: u64,
    /// 到期扫描间隔（秒）
    pub expiry_sweep_interval_secs: u64,
    /// 审计日志队列容量
    pub audit_buffer_size: usize,
    /// 通知队列容量
    pub notify_buffer_size: usize,
}

impl Config {
    /// 从环境变量加载配置，未设置时使用默认值
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/club".into()),
            http_port: env_parse("HTTP_PORT", 3000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            summary_cache_ttl_secs: env_parse("SUMMARY_CACHE_TTL_SECS", 300),
            expiry_sweep_interval_secs: env_parse("EXPIRY_SWEEP_INTERVAL_SECS", 3600),
            audit_buffer_size: env_parse("AUDIT_BUFFER_SIZE", 256),
            notify_buffer_size: env_parse("NOTIFY_BUFFER_SIZE", 256),
        }
    }

    /// SQLite 数据库文件路径
    pub fn db_path(&self) -> String {
        format!("{}/club.db", self.work_dir)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
