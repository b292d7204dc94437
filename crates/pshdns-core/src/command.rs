//! Translation of record descriptors into remote administrative commands
//!
//! Every mutating or probing operation against the DNS server is one
//! PowerShell DNS-server cmdlet invocation:
//!
//! - create: `Add-DnsServerResourceRecordA` (A) or
//!   `Add-DnsServerResourceRecord -CNAME|-PTR` (CNAME/PTR)
//! - existence probe: `Get-DnsServerResourceRecord` wrapped in a
//!   `try`/`catch` that prints [`FOUND_MARKER`] only when the lookup
//!   succeeded, so an absent record exits cleanly instead of failing
//! - delete: `Remove-DnsServerResourceRecord -Confirm:$false -Force`
//!
//! All interpolated values are validated and passed through PowerShell
//! single-quote literal quoting, so record data cannot alter the command
//! structure. When a DNS-server override is configured, `-ComputerName` is
//! attached to the DNS cmdlet itself.

use crate::error::{Error, Result};
use crate::record::{RecordConfig, RecordType};

/// Token the existence probe prints when the lookup succeeded
pub const FOUND_MARKER: &str = "RECORD_FOUND";

/// Build the command that creates the record.
///
/// Fails with `InvalidRecordConfiguration` before any remote call when the
/// type-specific value the record type requires is absent or malformed.
pub fn build_create_command(record: &RecordConfig, dns_server: Option<&str>) -> Result<String> {
    validate_names(record)?;
    let value = required_value(record)?;

    let mut command = match record.record_type {
        RecordType::A => format!(
            "Add-DnsServerResourceRecordA -ZoneName {} -Name {} -IPv4Address {}",
            quote(&record.zone_name),
            quote(&record.record_name),
            quote(value),
        ),
        RecordType::Cname => format!(
            "Add-DnsServerResourceRecord -ZoneName {} -CNAME -Name {} -HostNameAlias {}",
            quote(&record.zone_name),
            quote(&record.record_name),
            quote(value),
        ),
        RecordType::Ptr => format!(
            "Add-DnsServerResourceRecord -ZoneName {} -PTR -Name {} -PtrDomainName {}",
            quote(&record.zone_name),
            quote(&record.record_name),
            quote(value),
        ),
    };

    if let Some(server) = dns_server {
        push_computer_name(&mut command, server);
    }
    Ok(command)
}

/// Build the command that probes for the record's existence.
///
/// The probe succeeds whether or not the record exists; presence is
/// signalled by [`FOUND_MARKER`] in the output. The caller decides what a
/// missing marker means; the transport layer never does.
pub fn build_exists_command(record: &RecordConfig, dns_server: Option<&str>) -> Result<String> {
    validate_names(record)?;

    let mut lookup = format!(
        "Get-DnsServerResourceRecord -ZoneName {} -RRType {} -Name {}",
        quote(&record.zone_name),
        record.record_type,
        quote(&record.record_name),
    );
    if let Some(server) = dns_server {
        push_computer_name(&mut lookup, server);
    }

    Ok(format!(
        "try {{ $record = {lookup} -ErrorAction Stop }} catch {{ $record = $null }}; \
         if ($record) {{ Write-Host '{FOUND_MARKER}' }}"
    ))
}

/// Build the command that removes the record, unconfirmed and forced.
pub fn build_delete_command(record: &RecordConfig, dns_server: Option<&str>) -> Result<String> {
    validate_names(record)?;

    let mut command = format!(
        "Remove-DnsServerResourceRecord -ZoneName {} -RRType {} -Name {} -Confirm:$false -Force",
        quote(&record.zone_name),
        record.record_type,
        quote(&record.record_name),
    );
    if let Some(server) = dns_server {
        push_computer_name(&mut command, server);
    }
    Ok(command)
}

/// PowerShell single-quoted literal: embedded single quotes are doubled
fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

fn push_computer_name(command: &mut String, server: &str) {
    command.push_str(" -ComputerName ");
    command.push_str(&quote(server));
}

/// The type-specific value the record requires, validated for its type
fn required_value(record: &RecordConfig) -> Result<&str> {
    let field = match record.record_type {
        RecordType::A => "ipv4_address",
        RecordType::Cname => "hostname_alias",
        RecordType::Ptr => "ptr_domainname",
    };
    let value = record.type_value().ok_or_else(|| {
        Error::invalid_record(
            &record.record_name,
            format!(
                "must provide {field} when record_type is '{}'",
                record.record_type
            ),
        )
    })?;

    match record.record_type {
        RecordType::A => {
            if value.parse::<std::net::Ipv4Addr>().is_err() {
                return Err(Error::invalid_record(
                    &record.record_name,
                    format!("ipv4_address '{value}' is not a valid IPv4 address"),
                ));
            }
        }
        RecordType::Cname | RecordType::Ptr => {
            validate_domain_name(value)
                .map_err(|reason| Error::invalid_record(&record.record_name, reason))?;
        }
    }
    Ok(value)
}

fn validate_names(record: &RecordConfig) -> Result<()> {
    validate_domain_name(&record.zone_name)
        .map_err(|reason| Error::invalid_record(&record.record_name, format!("zone_name: {reason}")))?;
    validate_record_name(&record.record_name)
        .map_err(|reason| Error::invalid_record(&record.record_name, reason))
}

/// Validate a DNS domain name (RFC 1035 shape, trailing dot allowed).
///
/// Not comprehensive, but it catches common errors and keeps anything that
/// could alter command structure out of the interpolated text.
fn validate_domain_name(domain: &str) -> std::result::Result<(), String> {
    if domain.is_empty() {
        return Err("domain name cannot be empty".to_string());
    }

    let domain = domain.strip_suffix('.').unwrap_or(domain);

    // RFC 1035: 253 chars max
    if domain.len() > 253 {
        return Err(format!(
            "domain name too long: {} chars (max 253)",
            domain.len()
        ));
    }

    for label in domain.split('.') {
        if label.is_empty() {
            return Err(format!("domain name has empty label: '{domain}'"));
        }
        if label.len() > 63 {
            return Err(format!(
                "domain label too long: {} chars (max 63). Label: '{label}'",
                label.len()
            ));
        }
        if !label
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(format!(
                "domain label contains invalid characters. Label: '{label}'"
            ));
        }
        if label.starts_with('-') || label.ends_with('-') {
            return Err(format!(
                "domain label cannot start or end with hyphen. Label: '{label}'"
            ));
        }
    }

    Ok(())
}

/// Validate a record name within a zone.
///
/// Looser than a full domain name: `@` (zone apex) and a leading wildcard
/// label are allowed.
fn validate_record_name(name: &str) -> std::result::Result<(), String> {
    if name.is_empty() {
        return Err("record name cannot be empty".to_string());
    }
    if name == "@" {
        return Ok(());
    }
    let rest = name.strip_prefix("*.").unwrap_or(name);
    validate_domain_name(rest).map_err(|reason| format!("record name: {reason}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn a_record() -> RecordConfig {
        RecordConfig::new("corp.local", "host1", RecordType::A).with_ipv4_address("10.0.0.5")
    }

    #[test]
    fn create_a_record_command_shape() {
        let command = build_create_command(&a_record(), None).unwrap();
        assert_eq!(
            command,
            "Add-DnsServerResourceRecordA -ZoneName 'corp.local' -Name 'host1' -IPv4Address '10.0.0.5'"
        );
    }

    #[test]
    fn create_cname_and_ptr_command_shapes() {
        let cname = RecordConfig::new("corp.local", "www", RecordType::Cname)
            .with_hostname_alias("host1.corp.local");
        let command = build_create_command(&cname, None).unwrap();
        assert_eq!(
            command,
            "Add-DnsServerResourceRecord -ZoneName 'corp.local' -CNAME -Name 'www' -HostNameAlias 'host1.corp.local'"
        );

        let ptr = RecordConfig::new("0.0.10.in-addr.arpa", "5", RecordType::Ptr)
            .with_ptr_domainname("host1.corp.local");
        let command = build_create_command(&ptr, None).unwrap();
        assert_eq!(
            command,
            "Add-DnsServerResourceRecord -ZoneName '0.0.10.in-addr.arpa' -PTR -Name '5' -PtrDomainName 'host1.corp.local'"
        );
    }

    #[test]
    fn override_server_is_attached_to_every_command() {
        let record = a_record();
        let create = build_create_command(&record, Some("dc01.corp.local")).unwrap();
        assert!(create.ends_with("-ComputerName 'dc01.corp.local'"));

        let delete = build_delete_command(&record, Some("dc01.corp.local")).unwrap();
        assert!(delete.contains("-ComputerName 'dc01.corp.local'"));

        // For the existence probe the override must land on the inner
        // lookup, before -ErrorAction, not after the wrapper.
        let exists = build_exists_command(&record, Some("dc01.corp.local")).unwrap();
        assert!(exists.contains("-ComputerName 'dc01.corp.local' -ErrorAction Stop"));
    }

    #[test]
    fn exists_probe_prints_marker_only_on_success() {
        let command = build_exists_command(&a_record(), None).unwrap();
        assert_eq!(
            command,
            "try { $record = Get-DnsServerResourceRecord -ZoneName 'corp.local' -RRType A -Name 'host1' \
             -ErrorAction Stop } catch { $record = $null }; if ($record) { Write-Host 'RECORD_FOUND' }"
        );
        assert!(command.contains(FOUND_MARKER));
    }

    #[test]
    fn create_and_exists_address_the_same_record() {
        let record = a_record();
        let create = build_create_command(&record, None).unwrap();
        let exists = build_exists_command(&record, None).unwrap();
        // The probe queries the same zone, name, and type the create wrote
        assert!(create.contains("-ZoneName 'corp.local'") && exists.contains("-ZoneName 'corp.local'"));
        assert!(create.contains("-Name 'host1'") && exists.contains("-Name 'host1'"));
        assert!(exists.contains("-RRType A"));
    }

    #[test]
    fn missing_type_value_fails_naming_the_field() {
        let record = RecordConfig::new("corp.local", "host1", RecordType::A);
        let err = build_create_command(&record, None).unwrap_err();
        match err {
            Error::InvalidRecordConfiguration { reason, .. } => {
                assert!(reason.contains("ipv4_address"), "reason was: {reason}");
            }
            other => panic!("expected InvalidRecordConfiguration, got {other:?}"),
        }

        let record = RecordConfig::new("corp.local", "www", RecordType::Cname);
        let err = build_create_command(&record, None).unwrap_err();
        assert!(matches!(err, Error::InvalidRecordConfiguration { .. }));

        let record = RecordConfig::new("corp.local", "5", RecordType::Ptr);
        let err = build_create_command(&record, None).unwrap_err();
        assert!(matches!(err, Error::InvalidRecordConfiguration { .. }));
    }

    #[test]
    fn malformed_ipv4_is_rejected() {
        let record =
            RecordConfig::new("corp.local", "host1", RecordType::A).with_ipv4_address("10.0.0");
        let err = build_create_command(&record, None).unwrap_err();
        assert!(matches!(err, Error::InvalidRecordConfiguration { .. }));
    }

    #[test]
    fn values_with_quotes_cannot_break_out_of_the_literal() {
        let alias = "host1.corp.local";
        let quoted = quote("it's");
        assert_eq!(quoted, "'it''s'");

        let cname = RecordConfig::new("corp.local", "www", RecordType::Cname)
            .with_hostname_alias(alias);
        let command = build_create_command(&cname, None).unwrap();
        assert!(command.contains("'host1.corp.local'"));
    }

    #[test]
    fn hostile_record_names_are_rejected_before_quoting() {
        let record = RecordConfig::new("corp.local", "host1'; Remove-Item C:\\ -Recurse", RecordType::A)
            .with_ipv4_address("10.0.0.5");
        assert!(build_create_command(&record, None).is_err());
        assert!(build_exists_command(&record, None).is_err());
        assert!(build_delete_command(&record, None).is_err());

        let record = RecordConfig::new("corp..local", "host1", RecordType::A)
            .with_ipv4_address("10.0.0.5");
        assert!(build_create_command(&record, None).is_err());
    }

    #[test]
    fn apex_and_wildcard_record_names_are_allowed() {
        let record = RecordConfig::new("corp.local", "@", RecordType::A).with_ipv4_address("10.0.0.5");
        assert!(build_create_command(&record, None).is_ok());

        let record = RecordConfig::new("corp.local", "*.apps", RecordType::A)
            .with_ipv4_address("10.0.0.5");
        assert!(build_create_command(&record, None).is_ok());
    }

    #[test]
    fn delete_is_forced_and_unconfirmed() {
        let command = build_delete_command(&a_record(), None).unwrap();
        assert_eq!(
            command,
            "Remove-DnsServerResourceRecord -ZoneName 'corp.local' -RRType A -Name 'host1' -Confirm:$false -Force"
        );
    }
}
