//! `netmotion send`: fire one command datagram.

use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};

use tracing::debug;

use crate::{
    cli::SendArgs,
    error::{Error, Result},
};

/// Send `args.command` to the configured listener.
pub fn run(args: &SendArgs) -> Result<()> {
    let target = resolve(&args.address, args.port)?;
    send_command(target, &args.command)?;
    debug!(target = %target, command = %args.command, "command_sent");
    Ok(())
}

/// First socket address `address:port` resolves to.
fn resolve(address: &str, port: u16) -> Result<SocketAddr> {
    (address, port)
        .to_socket_addrs()?
        .next()
        .ok_or_else(|| Error::Unresolved(format!("{}:{}", address, port)))
}

/// Send `command` as a single Latin-1 datagram to `target`.
pub fn send_command(target: SocketAddr, command: &str) -> Result<()> {
    let local: SocketAddr = if target.is_ipv4() {
        ([0, 0, 0, 0], 0).into()
    } else {
        ([0u16; 8], 0).into()
    };
    let socket = UdpSocket::bind(local)?;
    socket.send_to(&encode_latin1(command), target)?;
    Ok(())
}

/// Encode as Latin-1; characters outside it become `?`.
fn encode_latin1(command: &str) -> Vec<u8> {
    command
        .chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn latin1_encoding() {
        assert_eq!(encode_latin1("Go"), b"Go".to_vec());
        assert_eq!(encode_latin1("G\u{e9}"), vec![b'G', 0xE9]);
        assert_eq!(encode_latin1("\u{2192}"), vec![b'?']);
    }

    #[test]
    fn datagram_arrives() {
        let rx = UdpSocket::bind("127.0.0.1:0").unwrap();
        rx.set_read_timeout(Some(Duration::from_secs(2))).unwrap();
        send_command(rx.local_addr().unwrap(), "MoveUpAll").unwrap();
        let mut buf = [0u8; 64];
        let (n, _) = rx.recv_from(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"MoveUpAll");
    }

    #[test]
    fn resolves_numeric_address() {
        let addr = resolve("127.0.0.1", 4000).unwrap();
        assert_eq!(addr, "127.0.0.1:4000".parse().unwrap());
    }
}
