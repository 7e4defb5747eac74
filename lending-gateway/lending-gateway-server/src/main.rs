//! The lending gateway server
#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]
#![deny(unsafe_code)]

use std::{collections::HashMap, error::Error, sync::Arc};

use clap::Parser;
use lending_gateway_api::{
    ExecuteSwapRequest, QuoteRequest, ValidateDepositRequest, WithdrawRequest, APR_ROUTE,
    BALANCE_ROUTE, EARNED_ROUTE, EXCHANGE_RATE_ROUTE, EXECUTE_SWAP_ROUTE, GATEWAYS_ROUTE,
    PING_ROUTE, POSITIONS_ROUTE, PROFIT_ROUTE, QUOTE_ROUTE, TX_STATUS_ROUTE,
    VALIDATE_DEPOSIT_ROUTE, WITHDRAW_ROUTE,
};
use lending_gateway_server::{
    cli::Cli,
    error::handle_rejection,
    handlers::{
        earnings::{
            apr_handler, balance_handler, earned_handler, exchange_rate_handler,
            positions_handler, profit_handler,
        },
        quote::{gateways_handler, quote_handler},
        swap::{
            execute_swap_handler, tx_status_handler, validate_deposit_handler, withdraw_handler,
        },
    },
    middleware::{identity, with_json_body, with_server, with_tracing},
    server::Server,
};
use tracing::info;
use warp::Filter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    cli.configure_telemetry();

    let port = cli.port; // copy `cli.port` to use after moving `cli`
    let server = Server::build_from_cli(cli).await.expect("failed to build server");

    // ----------
    // | Routes |
    // ----------

    let server = Arc::new(server);
    let ping = warp::get()
        .and(warp::path(PING_ROUTE))
        .and(warp::path::end())
        .map(|| warp::reply::with_status("PONG", warp::http::StatusCode::OK));

    // --- Quoting --- //

    let quote = warp::post()
        .and(warp::path(QUOTE_ROUTE))
        .and(warp::path::end())
        .and(warp::body::bytes())
        .map(with_json_body::<QuoteRequest>)
        .and_then(identity)
        .and(with_server(server.clone()))
        .and_then(quote_handler);

    let gateways = warp::get()
        .and(warp::path(GATEWAYS_ROUTE))
        .and(warp::path::param::<String>())
        .and(warp::path::end())
        .and(warp::query::<HashMap<String, String>>())
        .and(with_server(server.clone()))
        .and_then(gateways_handler);

    // --- Swaps --- //

    let validate_deposit = warp::post()
        .and(warp::path(VALIDATE_DEPOSIT_ROUTE))
        .and(warp::path::end())
        .and(warp::body::bytes())
        .map(with_json_body::<ValidateDepositRequest>)
        .and_then(identity)
        .and(with_server(server.clone()))
        .and_then(validate_deposit_handler);

    let execute_swap = warp::post()
        .and(warp::path(EXECUTE_SWAP_ROUTE))
        .and(warp::path::end())
        .and(warp::body::bytes())
        .map(with_json_body::<ExecuteSwapRequest>)
        .and_then(identity)
        .and(with_server(server.clone()))
        .and_then(execute_swap_handler);

    let withdraw = warp::post()
        .and(warp::path(WITHDRAW_ROUTE))
        .and(warp::path::end())
        .and(warp::body::bytes())
        .map(with_json_body::<WithdrawRequest>)
        .and_then(identity)
        .and(with_server(server.clone()))
        .and_then(withdraw_handler);

    let tx_status = warp::get()
        .and(warp::path(TX_STATUS_ROUTE))
        .and(warp::path::param::<String>())
        .and(warp::path::end())
        .and(with_server(server.clone()))
        .and_then(tx_status_handler);

    // --- Yield Accounting --- //

    let earned = warp::get()
        .and(warp::path(EARNED_ROUTE))
        .and(warp::path::param::<String>())
        .and(warp::path::param::<String>())
        .and(warp::path::end())
        .and(with_server(server.clone()))
        .and_then(earned_handler);

    let profit = warp::get()
        .and(warp::path(PROFIT_ROUTE))
        .and(warp::path::param::<String>())
        .and(warp::path::param::<String>())
        .and(warp::path::end())
        .and(with_server(server.clone()))
        .and_then(profit_handler);

    let apr = warp::get()
        .and(warp::path(APR_ROUTE))
        .and(warp::path::param::<String>())
        .and(warp::path::end())
        .and(with_server(server.clone()))
        .and_then(apr_handler);

    let exchange_rate = warp::get()
        .and(warp::path(EXCHANGE_RATE_ROUTE))
        .and(warp::path::param::<String>())
        .and(warp::path::end())
        .and(with_server(server.clone()))
        .and_then(exchange_rate_handler);

    let balance = warp::get()
        .and(warp::path(BALANCE_ROUTE))
        .and(warp::path::param::<String>())
        .and(warp::path::param::<String>())
        .and(warp::path::end())
        .and(with_server(server.clone()))
        .and_then(balance_handler);

    let positions = warp::get()
        .and(warp::path(POSITIONS_ROUTE))
        .and(warp::path::param::<String>())
        .and(warp::path::end())
        .and(with_server(server.clone()))
        .and_then(positions_handler);

    let routes = ping
        .or(quote)
        .or(gateways)
        .or(validate_deposit)
        .or(execute_swap)
        .or(withdraw)
        .or(tx_status)
        .or(earned)
        .or(profit)
        .or(apr)
        .or(exchange_rate)
        .or(balance)
        .or(positions)
        .with(with_tracing())
        .recover(handle_rejection);

    info!("listening on port {port}");
    warp::serve(routes).run(([0, 0, 0, 0], port)).await;

    Ok(())
}
