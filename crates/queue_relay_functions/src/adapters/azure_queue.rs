use azure_storage::{
    CloudLocation, ConnectionString, EndpointProtocol, StorageCredentials, EMULATOR_ACCOUNT,
};
use azure_storage_queues::{QueueClient, QueueServiceClientBuilder};
use tracing::debug;

use crate::adapters::queue_sender::QueueSender;

const PUBLIC_ENDPOINT_SUFFIX: &str = "core.windows.net";
const CHINA_ENDPOINT_SUFFIX: &str = "core.chinacloudapi.cn";
const EMULATOR_QUEUE_PORT: u16 = 10001;

/// Storage queue client built from an account connection string.
pub struct AzureQueueSender {
    queue_name: String,
    queue_client: QueueClient,
}

impl AzureQueueSender {
    pub fn connect(connection_string: &str, queue_name: &str) -> Result<Self, String> {
        let parsed = ConnectionString::new(connection_string)
            .map_err(|error| format!("invalid storage connection string: {error}"))?;
        let location = queue_location(&parsed)?;
        let credentials = queue_credentials(&parsed)?;
        debug!(account = location.account(), queue = queue_name, "connecting to storage queue");

        let service_client = QueueServiceClientBuilder::with_location(location, credentials).build();
        Ok(Self {
            queue_name: queue_name.to_string(),
            queue_client: service_client.queue_client(queue_name),
        })
    }
}

/// Where the queue service lives, honouring the emulator flag, an explicit
/// `QueueEndpoint` and a non-public `EndpointSuffix`.
fn queue_location(parsed: &ConnectionString<'_>) -> Result<CloudLocation, String> {
    if parsed.use_development_storage == Some(true) {
        return Ok(match parsed.development_storage_proxy_uri {
            Some(proxy) => CloudLocation::Custom {
                account: EMULATOR_ACCOUNT.to_string(),
                uri: format!(
                    "{}:{EMULATOR_QUEUE_PORT}/{EMULATOR_ACCOUNT}",
                    proxy.trim_end_matches('/')
                ),
            },
            None => CloudLocation::Emulator {
                address: "127.0.0.1".to_string(),
                port: EMULATOR_QUEUE_PORT,
            },
        });
    }

    if let Some(endpoint) = parsed.queue_endpoint {
        return Ok(CloudLocation::Custom {
            account: parsed.account_name.unwrap_or_default().to_string(),
            uri: endpoint.trim_end_matches('/').to_string(),
        });
    }

    let account = parsed
        .account_name
        .ok_or_else(|| "storage connection string is missing AccountName".to_string())?
        .to_string();
    Ok(match parsed.endpoint_suffix {
        None | Some(PUBLIC_ENDPOINT_SUFFIX) => CloudLocation::Public { account },
        Some(CHINA_ENDPOINT_SUFFIX) => CloudLocation::China { account },
        Some(suffix) => {
            let protocol = parsed
                .default_endpoints_protocol
                .as_ref()
                .unwrap_or(&EndpointProtocol::Https);
            CloudLocation::Custom {
                uri: format!("{protocol}://{account}.queue.{suffix}"),
                account,
            }
        }
    })
}

fn queue_credentials(parsed: &ConnectionString<'_>) -> Result<StorageCredentials, String> {
    let explicit = parsed.account_key.is_some() || parsed.sas.is_some();
    if parsed.use_development_storage == Some(true) && !explicit {
        return Ok(StorageCredentials::emulator());
    }
    parsed
        .storage_credentials()
        .map_err(|error| format!("unusable storage credentials: {error}"))
}

impl QueueSender for AzureQueueSender {
    fn send_message(&self, body: &str) -> Result<(), String> {
        let client = self.queue_client.clone();
        let message = body.to_string();
        debug!(queue = %self.queue_name, bytes = message.len(), "sending queue message");

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .put_message(message)
                    .await
                    .map(|_| ())
                    .map_err(|error| format!("failed to enqueue message: {error}"))
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use azure_storage::clients::ServiceType;

    use super::*;

    const KEY: &str = "AccountKey=a2V5;";

    fn queue_url(connection_string: &str) -> String {
        let parsed = ConnectionString::new(connection_string).expect("connection string parses");
        queue_location(&parsed)
            .expect("location resolves")
            .url(ServiceType::Queue)
            .expect("url builds")
            .to_string()
    }

    #[test]
    fn public_account_uses_default_suffix() {
        assert_eq!(
            queue_url(&format!("AccountName=relaydev;{KEY}EndpointSuffix=core.windows.net")),
            "https://relaydev.queue.core.windows.net/"
        );
    }

    #[test]
    fn development_storage_targets_the_emulator() {
        assert_eq!(
            queue_url("UseDevelopmentStorage=true"),
            "http://127.0.0.1:10001/devstoreaccount1"
        );
        assert_eq!(
            queue_url("UseDevelopmentStorage=true;DevelopmentStorageProxyUri=http://azurite/"),
            "http://azurite:10001/devstoreaccount1"
        );

        let parsed = ConnectionString::new("UseDevelopmentStorage=true").expect("parses");
        assert!(queue_credentials(&parsed).is_ok());
    }

    #[test]
    fn explicit_queue_endpoint_wins() {
        assert_eq!(
            queue_url(&format!(
                "AccountName=relaydev;{KEY}QueueEndpoint=http://localhost:10001/relaydev/"
            )),
            "http://localhost:10001/relaydev"
        );
    }

    #[test]
    fn custom_endpoint_suffix_and_protocol_are_honoured() {
        assert_eq!(
            queue_url(&format!(
                "DefaultEndpointsProtocol=http;AccountName=relaydev;{KEY}EndpointSuffix=stack.local"
            )),
            "http://relaydev.queue.stack.local/"
        );
        assert_eq!(
            queue_url(&format!("AccountName=relaydev;{KEY}EndpointSuffix=core.chinacloudapi.cn")),
            "https://relaydev.queue.core.chinacloudapi.cn/"
        );
    }

    #[test]
    fn account_is_required_without_endpoint_or_emulator() {
        let parsed = ConnectionString::new("SharedAccessSignature=sv=2022").expect("parses");
        let error = queue_location(&parsed).expect_err("account is required");
        assert!(error.contains("AccountName"));
    }
}
