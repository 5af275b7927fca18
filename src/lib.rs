use log::{info, warn};
use std::fmt;

// 子模块声明
pub mod cloudflare;
pub mod error;
pub mod local_ip;

// 重新导出常用类型
pub use cloudflare::CloudflareProvider;
pub use error::{DdnsError, Result};
pub use local_ip::local_ip;

// 通用的DNS记录结构
#[derive(Clone, Debug)]
pub struct DnsRecord {
    pub id: String,
    pub name: String,
    pub value: String,
    pub record_type: String,
}

// 单次同步的三种结局
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReconcileOutcome {
    Created,
    Updated,
    AlreadyCurrent,
}

impl fmt::Display for ReconcileOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconcileOutcome::Created => write!(f, "created"),
            ReconcileOutcome::Updated => write!(f, "updated"),
            ReconcileOutcome::AlreadyCurrent => write!(f, "already up-to-date"),
        }
    }
}

// DNS Provider trait - 所有DNS提供商必须实现这个trait
pub trait DnsProvider {
    fn get_record(&self) -> Result<Option<DnsRecord>>;
    fn modify_record(&self, current_ip: &str, record: &DnsRecord) -> Result<()>;
    fn add_record(&self, current_ip: &str) -> Result<()>;

    /// 对比现有记录并按需创建或修改，一次调用最多产生一次写操作
    fn ensure_record(&self, current_ip: &str) -> Result<ReconcileOutcome> {
        match self.get_record() {
            Ok(Some(record)) => {
                if current_ip != record.value {
                    info!("ip changed from {} to {}", record.value, current_ip);
                    self.modify_record(current_ip, &record)?;
                    Ok(ReconcileOutcome::Updated)
                } else {
                    info!("ip not changed");
                    Ok(ReconcileOutcome::AlreadyCurrent)
                }
            }
            Ok(None) => {
                info!("no such record, creating new one");
                self.add_record(current_ip)?;
                Ok(ReconcileOutcome::Created)
            }
            Err(e) => {
                warn!("error get record: {e}");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    // 内存里的假提供商，统计写操作次数
    struct MemoryProvider {
        record: RefCell<Option<DnsRecord>>,
        adds: Cell<usize>,
        modifies: Cell<usize>,
        fail_get: bool,
    }

    impl MemoryProvider {
        fn new(record: Option<DnsRecord>) -> Self {
            MemoryProvider {
                record: RefCell::new(record),
                adds: Cell::new(0),
                modifies: Cell::new(0),
                fail_get: false,
            }
        }

        fn existing(value: &str) -> Self {
            Self::new(Some(DnsRecord {
                id: "rec-1".to_string(),
                name: "home.example.com".to_string(),
                value: value.to_string(),
                record_type: "A".to_string(),
            }))
        }
    }

    impl DnsProvider for MemoryProvider {
        fn get_record(&self) -> Result<Option<DnsRecord>> {
            if self.fail_get {
                return Err(DdnsError::Provider("listing failed".to_string()));
            }
            Ok(self.record.borrow().clone())
        }

        fn modify_record(&self, current_ip: &str, record: &DnsRecord) -> Result<()> {
            self.modifies.set(self.modifies.get() + 1);
            *self.record.borrow_mut() = Some(DnsRecord {
                value: current_ip.to_string(),
                ..record.clone()
            });
            Ok(())
        }

        fn add_record(&self, current_ip: &str) -> Result<()> {
            self.adds.set(self.adds.get() + 1);
            *self.record.borrow_mut() = Some(DnsRecord {
                id: "rec-1".to_string(),
                name: "home.example.com".to_string(),
                value: current_ip.to_string(),
                record_type: "A".to_string(),
            });
            Ok(())
        }
    }

    #[test]
    fn creates_record_when_none_exists() {
        let provider = MemoryProvider::new(None);
        let outcome = provider.ensure_record("192.168.1.42").unwrap();
        assert_eq!(outcome, ReconcileOutcome::Created);
        assert_eq!(provider.adds.get(), 1);
        assert_eq!(provider.modifies.get(), 0);
    }

    #[test]
    fn does_nothing_when_record_is_current() {
        let provider = MemoryProvider::existing("192.168.1.42");
        let outcome = provider.ensure_record("192.168.1.42").unwrap();
        assert_eq!(outcome, ReconcileOutcome::AlreadyCurrent);
        assert_eq!(provider.adds.get(), 0);
        assert_eq!(provider.modifies.get(), 0);
    }

    #[test]
    fn updates_record_when_content_differs() {
        let provider = MemoryProvider::existing("192.168.1.7");
        let outcome = provider.ensure_record("192.168.1.42").unwrap();
        assert_eq!(outcome, ReconcileOutcome::Updated);
        assert_eq!(provider.adds.get(), 0);
        assert_eq!(provider.modifies.get(), 1);
        let record = provider.record.borrow().clone().unwrap();
        assert_eq!(record.id, "rec-1");
        assert_eq!(record.value, "192.168.1.42");
    }

    #[test]
    fn second_pass_with_same_ip_is_a_noop() {
        let provider = MemoryProvider::new(None);
        assert_eq!(
            provider.ensure_record("10.0.0.3").unwrap(),
            ReconcileOutcome::Created
        );
        assert_eq!(
            provider.ensure_record("10.0.0.3").unwrap(),
            ReconcileOutcome::AlreadyCurrent
        );
        assert_eq!(provider.adds.get(), 1);
        assert_eq!(provider.modifies.get(), 0);
    }

    #[test]
    fn get_record_failure_propagates_without_writes() {
        let mut provider = MemoryProvider::new(None);
        provider.fail_get = true;
        let err = provider.ensure_record("10.0.0.3").unwrap_err();
        assert!(matches!(err, DdnsError::Provider(_)));
        assert_eq!(provider.adds.get(), 0);
        assert_eq!(provider.modifies.get(), 0);
    }
}
